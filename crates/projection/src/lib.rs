//! Coordinate transformations between geographic space and image pixels.
//!
//! Implements the plate carrée (equirectangular) projection used for map
//! frames, without external dependencies.

pub mod equirectangular;

pub use equirectangular::{Equirectangular, PixelRect};
