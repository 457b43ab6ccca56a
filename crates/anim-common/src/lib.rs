//! Common types and utilities shared across the geo-animator crates.

pub mod bbox;
pub mod error;
pub mod format;
pub mod grid;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{AnimError, AnimResult};
pub use format::DataFormat;
pub use grid::{AxisOrder, Grid};
pub use time::{DateExtractor, DateRange, NamingConvention, SourceFile};
