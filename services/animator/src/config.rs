//! Configuration loader for the animator.
//!
//! Loads and validates the YAML run configuration. Supports environment
//! variable substitution using `${VAR}` and `${VAR:-default}` syntax.

use std::fs;
use std::path::{Path, PathBuf};

use anim_common::{AnimError, AnimResult, BoundingBox, DataFormat, DateRange, NamingConvention};
use animation::writer::image_format;
use renderer::{Colormap, MapFeatures, Normalization, Normalizer, TitleSpec};
use serde::{Deserialize, Serialize};

/// Return a configuration error unless `cond` holds.
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(AnimError::config(format!($($arg)+)));
        }
    };
}

// ============================================================================
// Configuration document
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatorConfig {
    pub data: DataConfig,
    pub date_range: DateRangeConfig,
    pub output: OutputConfig,
    pub visualization: VisualizationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub input_folder: PathBuf,
    pub file_pattern: String,
    /// `nc4`, `netcdf` or `geotiff`
    pub data_type: String,
    /// Variable to read from NetCDF files; ignored for GeoTIFF.
    #[serde(default)]
    pub variable_name: String,
    /// Position of the date among `_`-separated file name tokens,
    /// overriding the data type's default.
    #[serde(default)]
    pub date_token_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeConfig {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub images: ImagesConfig,
    pub gif: GifConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    pub enabled: bool,
    pub folder: PathBuf,
    #[serde(default = "default_image_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GifConfig {
    pub enabled: bool,
    pub folder: PathBuf,
    pub filename: String,
    /// Seconds each frame is shown.
    pub duration: f64,
    /// 0 loops forever.
    #[serde(rename = "loop", default)]
    pub loop_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    pub figure: FigureConfig,
    pub normalization: NormalizationConfig,
    pub colormap: String,
    #[serde(default)]
    pub colorbar: ColorbarConfig,
    pub region: RegionConfig,
    #[serde(default)]
    pub map_features: MapFeaturesConfig,
    pub title: TitleConfig,
    /// TrueType font for titles and labels; system fonts are tried otherwise.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Width and height in inches.
    pub size: [f64; 2],
    pub dpi: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub vmin: f64,
    pub vmax: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorbarConfig {
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapFeaturesConfig {
    #[serde(flatten)]
    pub toggles: MapFeatures,
    /// Directory holding `coastline.geojson`, `borders.geojson`,
    /// `land.geojson` and `ocean.geojson`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleConfig {
    pub enabled: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<String>,
    /// `pretty` or `json`
    #[serde(default)]
    pub format: Option<String>,
}

fn default_image_format() -> String {
    "png".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
pub const LOG_FORMATS: &[&str] = &["pretty", "json"];

// ============================================================================
// Loading
// ============================================================================

impl AnimatorConfig {
    /// Load, expand and validate the configuration at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> AnimResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AnimError::config(format!("failed to read config {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> AnimResult<Self> {
        let expanded = expand_env_vars(content)?;
        let config: Self = serde_yaml::from_str(&expanded)
            .map_err(|e| AnimError::config(format!("failed to parse config YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the run depends on.
    pub fn validate(&self) -> AnimResult<()> {
        let format = self.data_format()?;
        ensure!(
            !self.data.file_pattern.trim().is_empty(),
            "data.file_pattern cannot be empty"
        );
        if format.is_netcdf() {
            ensure!(
                !self.data.variable_name.trim().is_empty(),
                "data.variable_name is required for {} input",
                format
            );
        }

        self.date_range()?;
        self.region()?;
        self.normalization()?;
        Colormap::by_name(&self.visualization.colormap)?;
        self.title().validate()?;

        let [width, height] = self.visualization.figure.size;
        ensure!(
            width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0,
            "visualization.figure.size must be positive, got [{}, {}]",
            width,
            height
        );
        let dpi = self.visualization.figure.dpi;
        ensure!(dpi.is_finite() && dpi > 0.0, "visualization.figure.dpi must be positive, got {}", dpi);

        let images = &self.output.images;
        if images.enabled {
            ensure!(
                image_format(&images.format).is_some(),
                "output.images.format '{}' is not a supported image format",
                images.format
            );
        }

        let gif = &self.output.gif;
        ensure!(
            gif.duration.is_finite() && gif.duration >= 0.0,
            "output.gif.duration must be zero or more seconds, got {}",
            gif.duration
        );
        ensure!(
            gif.loop_count <= u16::MAX as u32,
            "output.gif.loop must be at most {}, got {}",
            u16::MAX,
            gif.loop_count
        );
        if gif.enabled {
            ensure!(!gif.filename.trim().is_empty(), "output.gif.filename cannot be empty");
        }

        if let Some(level) = &self.logging.level {
            ensure!(
                LOG_LEVELS.contains(&level.to_lowercase().as_str()),
                "Invalid log level: {}. Must be one of: {:?}",
                level,
                LOG_LEVELS
            );
        }
        if let Some(format) = &self.logging.format {
            ensure!(
                LOG_FORMATS.contains(&format.as_str()),
                "Invalid log format: {}. Must be one of: {:?}",
                format,
                LOG_FORMATS
            );
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Resolved values
    // ------------------------------------------------------------------------

    pub fn data_format(&self) -> AnimResult<DataFormat> {
        self.data
            .data_type
            .parse()
            .map_err(|e| AnimError::config(format!("data.data_type: {}", e)))
    }

    pub fn naming_convention(&self) -> AnimResult<NamingConvention> {
        Ok(match self.data.date_token_index {
            Some(index) => NamingConvention::with_token_index(index),
            None => NamingConvention::for_format(self.data_format()?),
        })
    }

    pub fn date_range(&self) -> AnimResult<DateRange> {
        DateRange::parse(&self.date_range.start, &self.date_range.end)
    }

    pub fn region(&self) -> AnimResult<BoundingBox> {
        let r = &self.visualization.region;
        BoundingBox::from_region(r.lon_min, r.lon_max, r.lat_min, r.lat_max)
    }

    pub fn normalization(&self) -> AnimResult<Normalization> {
        let n = &self.visualization.normalization;
        Normalizer::build(&n.kind, n.vmin, n.vmax)
    }

    pub fn map_features(&self) -> MapFeatures {
        self.visualization.map_features.toggles
    }

    pub fn title(&self) -> TitleSpec {
        let t = &self.visualization.title;
        TitleSpec {
            enabled: t.enabled,
            text: t.text.clone(),
            date_format: t.date_format.clone(),
        }
    }

    /// Full path of the GIF output file.
    pub fn gif_path(&self) -> PathBuf {
        self.output.gif.folder.join(&self.output.gif.filename)
    }

    /// Create the enabled output folders.
    pub fn ensure_output_dirs(&self) -> AnimResult<()> {
        let images = &self.output.images;
        let gif = &self.output.gif;
        for folder in [(images.enabled, &images.folder), (gif.enabled, &gif.folder)]
            .into_iter()
            .filter_map(|(enabled, folder)| enabled.then_some(folder))
        {
            fs::create_dir_all(folder).map_err(|e| {
                AnimError::config(format!("cannot create output folder {}: {}", folder.display(), e))
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content.
/// Supports ${VAR} and ${VAR:-default} syntax.
fn expand_env_vars(content: &str) -> AnimResult<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => {
                        return Err(AnimError::config(format!(
                            "Unclosed variable substitution: ${{{}",
                            var_expr
                        )))
                    }
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve a variable expression (`VAR` or `VAR:-default`).
fn resolve_var_expr(expr: &str) -> AnimResult<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .map_err(|_| AnimError::config(format!("Environment variable {} not set", expr)))
    }
}

// ============================================================================
// Tests
// ============================================================================
