//! End-to-end runs over small on-disk datasets.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use animator::{AnimatorConfig, Pipeline};
use chrono::NaiveDate;
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use tempfile::TempDir;
use test_utils::fixtures::{bbox, write_corrupt_file, write_daily_geotiffs, write_netcdf};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Opts<'a> {
    data_type: &'a str,
    pattern: &'a str,
    start: &'a str,
    end: &'a str,
    images: bool,
    gif: bool,
}

impl Default for Opts<'_> {
    fn default() -> Self {
        Self {
            data_type: "geotiff",
            pattern: "precip_*.tif",
            start: "2020-01-02",
            end: "2020-01-04",
            images: true,
            gif: true,
        }
    }
}

fn config(root: &Path, opts: Opts) -> AnimatorConfig {
    let yaml = format!(
        r#"
data:
  input_folder: "{input}"
  file_pattern: "{pattern}"
  data_type: "{data_type}"
  variable_name: "precipitation"
date_range:
  start: "{start}"
  end: "{end}"
output:
  images:
    enabled: {images}
    folder: "{frames}"
    format: "png"
  gif:
    enabled: {gif}
    folder: "{out}"
    filename: "animation.gif"
    duration: 0.25
    loop: 0
visualization:
  figure:
    size: [6, 4]
    dpi: 100
  normalization:
    type: "linear"
    vmin: 0
    vmax: 12
  colormap: "viridis"
  region:
    lon_min: 60
    lon_max: 100
    lat_min: 5
    lat_max: 40
  map_features:
    coastline: false
    borders: false
    land: false
    ocean: false
    gridlines: true
  title:
    enabled: false
"#,
        input = root.join("input").display(),
        frames = root.join("frames").display(),
        out = root.join("out").display(),
        pattern = opts.pattern,
        data_type = opts.data_type,
        start = opts.start,
        end = opts.end,
        images = opts.images,
        gif = opts.gif,
    );
    AnimatorConfig::from_yaml_str(&yaml).unwrap()
}

fn setup(days: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();
    write_daily_geotiffs(&input, "precip", ymd(2020, 1, 1), days, 8, 7, bbox::SOUTH_ASIA).unwrap();
    dir
}

fn gif_frame_count(path: &Path) -> usize {
    let decoder = GifDecoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    decoder.into_frames().collect_frames().unwrap().len()
}

#[test]
fn test_date_window_selects_three_of_five_days() {
    let dir = setup(5);
    let pipeline = Pipeline::new(&config(dir.path(), Opts::default())).unwrap();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.frames.len(), 3);
    assert!(summary.skipped.is_empty());

    let frames = dir.path().join("frames");
    for i in 0..3 {
        assert!(frames.join(format!("frame_{:03}.png", i)).exists());
    }
    assert!(!frames.join("frame_003.png").exists());

    let gif = dir.path().join("out").join("animation.gif");
    assert_eq!(summary.animation.as_deref(), Some(gif.as_path()));
    assert_eq!(gif_frame_count(&gif), 3);
}

#[test]
fn test_frames_follow_the_data() {
    let dir = setup(3);
    let opts = Opts {
        start: "2020-01-01",
        end: "2020-01-03",
        gif: false,
        ..Opts::default()
    };
    let summary = Pipeline::new(&config(dir.path(), opts)).unwrap().run().unwrap();
    assert_eq!(summary.frames.len(), 3);
    assert!(summary.animation.is_none());

    let paths = summary.frames.paths();
    let first = image::open(&paths[0]).unwrap().to_rgba8();
    let last = image::open(&paths[2]).unwrap().to_rgba8();
    assert_eq!(first.dimensions(), (600, 400));
    assert_eq!(first.dimensions(), last.dimensions());
    assert_ne!(first.as_raw(), last.as_raw());
}

#[test]
fn test_corrupt_file_is_skipped_without_gap() {
    let dir = setup(3);
    write_corrupt_file(&dir.path().join("input").join("precip_20200102.tif")).unwrap();
    let opts = Opts {
        start: "2020-01-01",
        end: "2020-01-03",
        ..Opts::default()
    };
    let summary = Pipeline::new(&config(dir.path(), opts)).unwrap().run().unwrap();

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.frames.len(), 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].kind, "data_load");
    assert!(summary.skipped[0].path.ends_with("precip_20200102.tif"));

    let frames = dir.path().join("frames");
    assert!(frames.join("frame_000.png").exists());
    assert!(frames.join("frame_001.png").exists());
    assert!(!frames.join("frame_002.png").exists());
    assert_eq!(gif_frame_count(&dir.path().join("out").join("animation.gif")), 2);
}

#[test]
fn test_assembly_failure_fails_run_and_keeps_frames() {
    let dir = setup(3);
    // A directory squatting on the GIF path makes the final rename fail.
    std::fs::create_dir_all(dir.path().join("out").join("animation.gif")).unwrap();
    let opts = Opts {
        start: "2020-01-01",
        end: "2020-01-03",
        ..Opts::default()
    };
    let err = Pipeline::new(&config(dir.path(), opts)).unwrap().run().unwrap_err();
    assert_eq!(err.kind(), "assembly");

    let frames = dir.path().join("frames");
    for i in 0..3 {
        assert!(frames.join(format!("frame_{:03}.png", i)).exists());
    }
    assert!(dir.path().join("out").join("animation.gif").is_dir());
}

#[test]
fn test_images_disabled_writes_nothing() {
    let dir = setup(3);
    let opts = Opts {
        images: false,
        ..Opts::default()
    };
    let summary = Pipeline::new(&config(dir.path(), opts)).unwrap().run().unwrap();

    assert_eq!(summary.discovered, 2);
    assert!(summary.frames.is_empty());
    assert!(summary.skipped.is_empty());
    assert!(summary.animation.is_none());
    assert!(!dir.path().join("frames").exists());
    assert!(!dir.path().join("out").join("animation.gif").exists());
}

#[test]
fn test_empty_window_is_not_an_error() {
    let dir = setup(2);
    let opts = Opts {
        start: "2021-01-01",
        end: "2021-12-31",
        ..Opts::default()
    };
    let summary = Pipeline::new(&config(dir.path(), opts)).unwrap().run().unwrap();
    assert_eq!(summary.discovered, 0);
    assert!(summary.frames.is_empty());
    assert!(summary.animation.is_none());
}

#[test]
fn test_netcdf_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).unwrap();

    let lons: Vec<f64> = (0..9).map(|i| 60.0 + 5.0 * i as f64).collect();
    let lats: Vec<f64> = (0..8).map(|j| 5.0 + 5.0 * j as f64).collect();
    for (day, value) in [(1, 2.0f32), (2, 8.0)] {
        let data = vec![value; lons.len() * lats.len()];
        let path = input.join(format!("imerg_daily_202001{:02}.nc4", day));
        write_netcdf(&path, "precipitation", &lons, &lats, &data, true, None).unwrap();
    }

    let opts = Opts {
        data_type: "nc4",
        pattern: "imerg_daily_*.nc4",
        start: "2020-01-01",
        end: "2020-01-31",
        ..Opts::default()
    };
    let summary = Pipeline::new(&config(dir.path(), opts)).unwrap().run().unwrap();
    assert_eq!(summary.frames.len(), 2);
    assert!(summary.skipped.is_empty());
    assert_eq!(gif_frame_count(&dir.path().join("out").join("animation.gif")), 2);
}
