//! Raster-to-animation pipeline.
//!
//! Discovers dated raster files, renders each one as a map frame, and
//! assembles the frames into a looping GIF.

pub mod config;
pub mod discovery;
pub mod pipeline;

pub use config::AnimatorConfig;
pub use discovery::FileDiscoverer;
pub use pipeline::{Pipeline, RunSummary, SkippedFile};
