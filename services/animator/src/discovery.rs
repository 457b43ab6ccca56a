//! Input file discovery and date-range filtering.

use std::path::{Path, PathBuf};

use anim_common::{AnimError, AnimResult, DateExtractor, DateRange, NamingConvention, SourceFile};
use tracing::{debug, info, warn};

/// Finds the input files of a run.
#[derive(Debug, Clone)]
pub struct FileDiscoverer {
    folder: PathBuf,
    pattern: String,
    convention: NamingConvention,
}

impl FileDiscoverer {
    pub fn new(folder: impl Into<PathBuf>, pattern: impl Into<String>, convention: NamingConvention) -> Self {
        Self {
            folder: folder.into(),
            pattern: pattern.into(),
            convention,
        }
    }

    /// Glob expression for `folder/pattern`, with the folder taken literally.
    fn glob_expression(&self) -> String {
        let folder = glob::Pattern::escape(&self.folder.to_string_lossy());
        Path::new(&folder).join(&self.pattern).to_string_lossy().into_owned()
    }

    /// Files matching the pattern whose date lies in `range` (inclusive).
    ///
    /// Results are in lexicographic path order, which is chronological only
    /// when file names sort by date. Files whose date cannot be read are
    /// skipped with a warning.
    pub fn discover(&self, range: &DateRange) -> AnimResult<Vec<SourceFile>> {
        let expression = self.glob_expression();
        let entries = glob::glob(&expression).map_err(|e| {
            AnimError::config(format!("invalid file pattern '{}': {}", expression, e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => warn!(path = %e.path().display(), error = %e.error(), "Could not read directory entry"),
            }
        }
        paths.sort();
        let matched = paths.len();

        let mut files = Vec::new();
        for path in paths {
            match DateExtractor::extract(&path, &self.convention) {
                Ok(date) if range.contains(date) => files.push(SourceFile { path, date }),
                Ok(date) => debug!(path = %path.display(), %date, "Outside date range"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not process file"),
            }
        }

        if files.windows(2).any(|w| w[0].date > w[1].date) {
            debug!("File order is not chronological; frames follow file name order");
        }

        info!(
            pattern = %expression,
            matched,
            selected = files.len(),
            start = %range.start,
            end = %range.end,
            "Found {} files in the date range",
            files.len()
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anim_common::DataFormat;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_glob_expression_escapes_folder() {
        let d = FileDiscoverer::new(
            "/data/run[1]",
            "*.tif",
            NamingConvention::for_format(DataFormat::GeoTiff),
        );
        assert_eq!(d.glob_expression(), "/data/run[[]1[]]/*.tif");
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let d = FileDiscoverer::new(dir.path(), "***[", NamingConvention::with_token_index(1));
        let range = DateRange::parse("2020-01-01", "2020-01-02").unwrap();
        assert!(matches!(d.discover(&range), Err(AnimError::Config(_))));
    }

    #[test]
    fn test_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "precip_20200103.tif",
            "precip_20200101.tif",
            "precip_20200102.tif",
            "precip_notadate.tif",
            "readme.txt",
        ] {
            touch(dir.path(), name);
        }
        let d = FileDiscoverer::new(
            dir.path(),
            "*.tif",
            NamingConvention::for_format(DataFormat::GeoTiff),
        );
        let range = DateRange::parse("2020-01-02", "2020-01-03").unwrap();
        let files = d.discover(&range).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["precip_20200102.tif", "precip_20200103.tif"]);
    }
}
