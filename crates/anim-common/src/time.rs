//! Date handling: file-name date extraction and inclusive date ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AnimError, AnimResult};
use crate::format::DataFormat;

/// Length of the `YYYYMMDD` date token.
const DATE_TOKEN_LEN: usize = 8;

/// Where the date lives in a file name.
///
/// File names are split on `_`; the token at `token_index` (with any
/// extension after the first `.` removed) must hold a `YYYYMMDD` date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConvention {
    pub token_index: usize,
}

impl NamingConvention {
    /// Convention for a data format: `imerg_daily_19990101.nc4` for NetCDF,
    /// `precip_20200101.tif` for GeoTIFF.
    pub fn for_format(format: DataFormat) -> Self {
        match format {
            DataFormat::Nc4 | DataFormat::NetCdf => Self { token_index: 2 },
            DataFormat::GeoTiff => Self { token_index: 1 },
        }
    }

    /// Look up a convention by its configured name.
    pub fn from_name(name: &str) -> AnimResult<Self> {
        match name.parse::<DataFormat>() {
            Ok(format) => Ok(Self::for_format(format)),
            Err(_) => Err(AnimError::date_parse(
                "",
                format!("unrecognized naming convention '{}'", name),
            )),
        }
    }

    /// Explicit token position, for naming schemes that differ from the defaults.
    pub fn with_token_index(token_index: usize) -> Self {
        Self { token_index }
    }
}

/// Derives calendar dates from file names.
pub struct DateExtractor;

impl DateExtractor {
    /// Extract the date embedded in `path`'s file name.
    pub fn extract(path: &Path, convention: &NamingConvention) -> AnimResult<NaiveDate> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| AnimError::date_parse(path.display().to_string(), "no file name"))?;

        let token = name
            .split('_')
            .nth(convention.token_index)
            .ok_or_else(|| {
                AnimError::date_parse(
                    name,
                    format!("no date token at position {}", convention.token_index),
                )
            })?;
        let token = token.split('.').next().unwrap_or(token);

        parse_date_token(token).map_err(|reason| AnimError::date_parse(name, reason))
    }
}

/// Parse an exact 8-digit `YYYYMMDD` token.
pub fn parse_date_token(token: &str) -> Result<NaiveDate, String> {
    if token.len() != DATE_TOKEN_LEN || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not an 8-digit YYYYMMDD token", token));
    }
    NaiveDate::parse_from_str(token, "%Y%m%d")
        .map_err(|e| format!("'{}' is not a valid date: {}", token, e))
}

/// A closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AnimResult<Self> {
        if start > end {
            return Err(AnimError::config(format!(
                "date_range.start ({}) is after date_range.end ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse ISO `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, end: &str) -> AnimResult<Self> {
        let parse = |field: &str, s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| AnimError::config(format!("date_range.{} '{}': {}", field, s, e)))
        };
        Self::new(parse("start", start)?, parse("end", end)?)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// An input file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_netcdf_convention() {
        let conv = NamingConvention::for_format(DataFormat::Nc4);
        let date = DateExtractor::extract(Path::new("/data/imerg_daily_19990101.nc4"), &conv).unwrap();
        assert_eq!(date, ymd(1999, 1, 1));
    }

    #[test]
    fn test_extract_geotiff_convention() {
        let conv = NamingConvention::for_format(DataFormat::GeoTiff);
        let date = DateExtractor::extract(Path::new("precip_20200229.tif"), &conv).unwrap();
        assert_eq!(date, ymd(2020, 2, 29));
    }

    #[test]
    fn test_extract_rejects_bad_tokens() {
        let conv = NamingConvention::for_format(DataFormat::GeoTiff);
        for name in [
            "precip_2020011.tif",
            "precip_202001011.tif",
            "precip_2020O101.tif",
            "precip_20200230.tif",
            "precip.tif",
        ] {
            let err = DateExtractor::extract(Path::new(name), &conv).unwrap_err();
            assert!(matches!(err, AnimError::DateParse { .. }), "{} should fail", name);
        }
    }

    #[test]
    fn test_token_override() {
        let conv = NamingConvention::with_token_index(0);
        let date = DateExtractor::extract(Path::new("20210704_rain.tif"), &conv).unwrap();
        assert_eq!(date, ymd(2021, 7, 4));
    }

    #[test]
    fn test_unknown_convention() {
        let err = NamingConvention::from_name("grib2").unwrap_err();
        assert!(matches!(err, AnimError::DateParse { .. }));
        assert_eq!(NamingConvention::from_name("netcdf").unwrap().token_index, 2);
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::parse("2020-01-02", "2020-01-04").unwrap();
        assert!(range.contains(ymd(2020, 1, 2)));
        assert!(range.contains(ymd(2020, 1, 4)));
        assert!(!range.contains(ymd(2020, 1, 1)));
        assert!(!range.contains(ymd(2020, 1, 5)));
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        assert!(matches!(
            DateRange::parse("2020-02-01", "2020-01-01"),
            Err(AnimError::Config(_))
        ));
        assert!(DateRange::parse("2020/01/01", "2020-01-02").is_err());
    }
}
