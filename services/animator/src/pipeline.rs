//! The end-to-end run: discover, then load, render and persist each file,
//! then assemble the animation.
//!
//! Files are processed strictly one after another. Everything a file needs
//! (grid, canvas, image) lives inside [`Pipeline::process_file`] and is
//! dropped when it returns, so memory use stays flat across long runs.

use std::path::PathBuf;

use anim_common::{AnimResult, BoundingBox, DateRange, SourceFile};
use animation::{progress_bar, AnimationAssembler, FrameSequence, FrameWriter, RenderedFrame};
use grid_loader::GridLoader;
use renderer::legend::DEFAULT_LABEL;
use renderer::{
    Colormap, FeatureLayers, FontBook, FrameRenderer, FrameStyle, MapFeatures, Normalization,
    TitleSpec,
};
use tracing::{debug, error, info, warn};

use crate::config::AnimatorConfig;
use crate::discovery::FileDiscoverer;

/// A file that was discovered but produced no frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    /// Error category, e.g. `data_load`
    pub kind: &'static str,
    pub reason: String,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files selected by discovery.
    pub discovered: usize,
    pub frames: FrameSequence,
    pub skipped: Vec<SkippedFile>,
    /// Path of the assembled GIF, when one was written.
    pub animation: Option<PathBuf>,
}

/// Everything fixed for the duration of one run.
pub struct Pipeline {
    discoverer: FileDiscoverer,
    range: DateRange,
    loader: GridLoader,
    region: BoundingBox,
    norm: Normalization,
    features: MapFeatures,
    title: TitleSpec,
    renderer: FrameRenderer,
    writer: FrameWriter,
    gif: Option<(AnimationAssembler, PathBuf)>,
}

impl Pipeline {
    /// Resolve the configuration into run-wide components.
    pub fn new(config: &AnimatorConfig) -> AnimResult<Self> {
        let format = config.data_format()?;
        let discoverer = FileDiscoverer::new(
            &config.data.input_folder,
            &config.data.file_pattern,
            config.naming_convention()?,
        );
        let loader = GridLoader::new(format, &config.data.variable_name);

        let vis = &config.visualization;
        let features = config.map_features();
        let layers = FeatureLayers::load(vis.map_features.data_dir.as_deref(), &features);
        let font = FontBook::load(vis.font_path.as_deref());
        let style = FrameStyle {
            size_in: (vis.figure.size[0], vis.figure.size[1]),
            dpi: vis.figure.dpi,
            colormap: Colormap::by_name(&vis.colormap)?,
            colorbar_label: vis
                .colorbar
                .label
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        };

        let images = &config.output.images;
        let writer = FrameWriter::new(images.enabled, &images.folder, &images.format);
        let gif_cfg = &config.output.gif;
        let gif = gif_cfg.enabled.then(|| {
            (
                AnimationAssembler::new(gif_cfg.duration, gif_cfg.loop_count.min(u16::MAX as u32) as u16),
                config.gif_path(),
            )
        });
        if gif.is_some() && !images.enabled {
            warn!("GIF output is enabled but image output is disabled; no animation will be produced");
        }

        let renderer = FrameRenderer::new(style, layers, font);
        debug!(font = renderer.has_font(), dpi = vis.figure.dpi, "Frame renderer ready");

        config.ensure_output_dirs()?;

        info!(
            data_type = %format,
            input = %config.data.input_folder.display(),
            colormap = %vis.colormap,
            images = images.enabled,
            gif = gif_cfg.enabled,
            "Pipeline initialised"
        );

        Ok(Self {
            discoverer,
            range: config.date_range()?,
            loader,
            region: config.region()?,
            norm: config.normalization()?,
            features,
            title: config.title(),
            renderer,
            writer,
            gif,
        })
    }

    /// Run the whole pipeline once.
    ///
    /// Per-file failures are recorded in the summary and the run continues;
    /// configuration and assembly failures end the run with an error.
    pub fn run(&self) -> AnimResult<RunSummary> {
        let files = self.discoverer.discover(&self.range)?;
        let mut summary = RunSummary {
            discovered: files.len(),
            ..RunSummary::default()
        };

        let pb = progress_bar(files.len(), "Processing frames");
        for file in &files {
            match self.process_file(file, summary.frames.next_index()) {
                Ok(Some(frame)) => summary.frames.push(frame),
                Ok(None) => {}
                Err(e) if e.is_per_file() => {
                    pb.suspend(|| {
                        warn!(path = %file.path.display(), kind = e.kind(), error = %e, "Skipping file")
                    });
                    summary.skipped.push(SkippedFile {
                        path: file.path.clone(),
                        kind: e.kind(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            discovered = summary.discovered,
            frames = summary.frames.len(),
            skipped = summary.skipped.len(),
            "Processed files"
        );

        if let Some((assembler, output)) = &self.gif {
            if summary.frames.is_empty() {
                warn!("No frames were written; skipping GIF creation");
            } else {
                info!(frames = summary.frames.len(), "Creating GIF animation");
                if let Err(e) = assembler.assemble_sequence(&summary.frames, output) {
                    error!(error = %e, "GIF assembly failed; frames are kept on disk");
                    return Err(e);
                }
                summary.animation = Some(output.clone());
            }
        }

        Ok(summary)
    }

    /// Load, render and persist one file.
    ///
    /// Returns `None` when image output is disabled: the frame is rendered
    /// and then released without being written.
    fn process_file(&self, file: &SourceFile, index: usize) -> AnimResult<Option<RenderedFrame>> {
        let grid = self.loader.load(&file.path)?;
        let image = self
            .renderer
            .render(&grid, &self.region, &self.norm, &self.features, &self.title, file.date)?;
        drop(grid);

        if !self.writer.is_enabled() {
            debug!(path = %file.path.display(), "Image output disabled, frame discarded");
            return Ok(None);
        }
        let frame = self.writer.write(image, index)?;
        debug!(
            path = %file.path.display(),
            date = %file.date,
            index = frame.index,
            "Frame complete"
        );
        Ok(Some(frame))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("range", &self.range)
            .field("format", &self.loader.format())
            .field("region", &self.region)
            .field("frames", &self.writer.folder())
            .field("gif", &self.gif.as_ref().map(|(_, path)| path))
            .finish()
    }
}

