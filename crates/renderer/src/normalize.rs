//! Value normalization onto the unit interval before color mapping.

use std::fmt;
use std::str::FromStr;

use anim_common::{AnimError, AnimResult};
use serde::{Deserialize, Serialize};

/// Scale used to normalize raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormKind {
    Linear,
    Log,
}

impl FromStr for NormKind {
    type Err = AnimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "log" => Ok(Self::Log),
            other => Err(AnimError::config(format!(
                "unsupported normalization type '{}' (expected linear or log)",
                other
            ))),
        }
    }
}

impl fmt::Display for NormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Log => write!(f, "log"),
        }
    }
}

/// A value-to-unit mapping, fixed for the whole run.
///
/// Results are not clipped: values outside `[vmin, vmax]` land below 0 or
/// above 1 so the colormap can apply its extension colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub kind: NormKind,
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalization {
    /// Map a raw value to normalized space. Missing values stay `NaN`.
    ///
    /// For `Log`, non-positive values have no logarithm and map to `NaN`.
    /// A non-positive `vmin` is not rejected; it makes every value `NaN`.
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        match self.kind {
            NormKind::Linear => (value - self.vmin) / (self.vmax - self.vmin),
            NormKind::Log => {
                if value <= 0.0 || self.vmin <= 0.0 {
                    return f64::NAN;
                }
                let (lo, hi) = (self.vmin.ln(), self.vmax.ln());
                (value.ln() - lo) / (hi - lo)
            }
        }
    }
}

/// Builds a [`Normalization`] from configuration values.
pub struct Normalizer;

impl Normalizer {
    /// `kind` is `linear` or `log`; anything else is a configuration error.
    pub fn build(kind: &str, vmin: f64, vmax: f64) -> AnimResult<Normalization> {
        let kind: NormKind = kind.parse()?;
        if !vmin.is_finite() || !vmax.is_finite() {
            return Err(AnimError::config(format!(
                "normalization bounds must be finite (vmin={}, vmax={})",
                vmin, vmax
            )));
        }
        if vmin >= vmax {
            return Err(AnimError::config(format!(
                "normalization vmin ({}) must be less than vmax ({})",
                vmin, vmax
            )));
        }
        Ok(Normalization { kind, vmin, vmax })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_midpoint() {
        let norm = Normalizer::build("linear", 0.0, 10.0).unwrap();
        assert_eq!(norm.normalize(5.0), 0.5);
        assert_eq!(norm.normalize(0.0), 0.0);
        assert_eq!(norm.normalize(10.0), 1.0);
    }

    #[test]
    fn test_linear_is_not_clipped() {
        let norm = Normalizer::build("linear", 0.0, 10.0).unwrap();
        assert_eq!(norm.normalize(-5.0), -0.5);
        assert_eq!(norm.normalize(20.0), 2.0);
    }

    #[test]
    fn test_log_decades() {
        let norm = Normalizer::build("log", 0.1, 100.0).unwrap();
        assert!((norm.normalize(0.1) - 0.0).abs() < 1e-12);
        assert!((norm.normalize(1.0) - 1.0 / 3.0).abs() < 1e-12);
        assert!((norm.normalize(10.0) - 2.0 / 3.0).abs() < 1e-12);
        assert!((norm.normalize(100.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_non_positive_is_nan() {
        let norm = Normalizer::build("log", 0.1, 100.0).unwrap();
        assert!(norm.normalize(0.0).is_nan());
        assert!(norm.normalize(-3.0).is_nan());
    }

    #[test]
    fn test_log_with_non_positive_vmin_is_not_corrected() {
        let norm = Normalizer::build("log", 0.0, 100.0).unwrap();
        assert_eq!(norm.vmin, 0.0);
        assert!(norm.normalize(10.0).is_nan());
    }

    #[test]
    fn test_nan_passes_through() {
        let norm = Normalizer::build("linear", 0.0, 1.0).unwrap();
        assert!(norm.normalize(f64::NAN).is_nan());
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(Normalizer::build("sqrt", 0.0, 1.0), Err(AnimError::Config(_))));
        assert!(matches!(Normalizer::build("linear", 5.0, 5.0), Err(AnimError::Config(_))));
        assert!(Normalizer::build("linear", f64::NAN, 1.0).is_err());
        assert_eq!(Normalizer::build("LOG", 1.0, 2.0).unwrap().kind, NormKind::Log);
    }
}
