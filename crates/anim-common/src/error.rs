//! Error types for the frame-generation pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using AnimError.
pub type AnimResult<T> = Result<T, AnimError>;

/// Primary error type for the animation pipeline.
#[derive(Debug, Error)]
pub enum AnimError {
    // === Run-level Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Animation assembly failed: {0}")]
    Assembly(String),

    // === Per-file Errors ===
    #[error("Could not parse date from '{file}': {reason}")]
    DateParse { file: String, reason: String },

    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load data from {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnimError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn date_parse(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DateParse {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub fn data_load(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::DataLoad {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is contained at the file-processing boundary.
    ///
    /// Per-file errors cause the current input to be skipped with a warning;
    /// everything else terminates the run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            AnimError::DateParse { .. }
                | AnimError::UnsupportedFormat(_)
                | AnimError::DataLoad { .. }
                | AnimError::Render(_)
                | AnimError::Write { .. }
        )
    }

    /// Short stable name of the error kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AnimError::Config(_) => "config",
            AnimError::Assembly(_) => "assembly",
            AnimError::DateParse { .. } => "date_parse",
            AnimError::UnsupportedFormat(_) => "unsupported_format",
            AnimError::DataLoad { .. } => "data_load",
            AnimError::Render(_) => "render",
            AnimError::Write { .. } => "write",
            AnimError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_file_errors_are_recoverable() {
        assert!(AnimError::date_parse("a.nc4", "bad").is_per_file());
        assert!(AnimError::UnsupportedFormat("hdf".into()).is_per_file());
        assert!(AnimError::data_load("a.nc4", "missing").is_per_file());
        assert!(AnimError::render("canvas").is_per_file());
        assert!(AnimError::write("frame_000.png", "denied").is_per_file());
    }

    #[test]
    fn run_level_errors_are_fatal() {
        assert!(!AnimError::config("vmin").is_per_file());
        assert!(!AnimError::assembly("empty").is_per_file());
        let io = AnimError::from(std::io::Error::other("boom"));
        assert!(!io.is_per_file());
        assert!(io.to_string().contains("boom"));
    }

    #[test]
    fn display_includes_path() {
        let err = AnimError::data_load("/data/imerg_daily_20200101.nc4", "variable missing");
        let msg = err.to_string();
        assert!(msg.contains("imerg_daily_20200101.nc4"));
        assert!(msg.contains("variable missing"));
        assert_eq!(err.kind(), "data_load");
    }
}
