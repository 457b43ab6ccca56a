//! Map frame rendering for gridded data.
//!
//! - Value normalization (linear, log) and named colormaps
//! - Equirectangular color mesh with a colorbar legend
//! - Coastline, border, land and ocean overlays from GeoJSON
//! - Graticule with edge labels and a two-line title

pub mod colormap;
pub mod features;
pub mod frame;
pub mod graticule;
pub mod layout;
pub mod legend;
pub mod normalize;
pub mod text;

pub use colormap::{Color, Colormap};
pub use features::{FeatureLayers, MapFeatures};
pub use frame::{FrameImage, FrameRenderer, FrameStyle, TitleSpec};
pub use normalize::{NormKind, Normalization, Normalizer};
pub use text::FontBook;
