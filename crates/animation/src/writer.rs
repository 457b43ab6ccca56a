//! Writing rendered frames to numbered image files.

use std::path::{Path, PathBuf};

use anim_common::{AnimError, AnimResult};
use image::{DynamicImage, ImageFormat};
use renderer::FrameImage;
use tracing::debug;

/// A frame persisted to disk.
///
/// `index` is zero-based and counts only frames that were written
/// successfully, so a sequence never has gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub index: usize,
    pub path: PathBuf,
}

/// Ordered frames of one run, appended as they are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<RenderedFrame>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next written frame must carry.
    pub fn next_index(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, frame: RenderedFrame) {
        debug_assert_eq!(frame.index, self.frames.len(), "frame indices must be contiguous");
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedFrame> {
        self.frames.iter()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.frames.iter().map(|f| f.path.clone()).collect()
    }
}

/// Resolve an image file extension (`png`, `jpg`, ...) to an encoder format.
pub fn image_format(extension: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(extension.trim_start_matches('.').to_ascii_lowercase())
        .filter(|format| format.can_write())
}

/// File name of frame `index`: `frame_007.png`.
pub fn frame_file_name(index: usize, extension: &str) -> String {
    format!("frame_{:03}.{}", index, extension)
}

/// Persists frames as `folder/frame_{index:03}.{format}`.
#[derive(Debug, Clone)]
pub struct FrameWriter {
    enabled: bool,
    folder: PathBuf,
    extension: String,
}

impl FrameWriter {
    pub fn new(enabled: bool, folder: impl Into<PathBuf>, format: &str) -> Self {
        Self {
            enabled,
            folder: folder.into(),
            extension: format.trim_start_matches('.').to_lowercase(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Write `frame` as frame number `index`.
    ///
    /// The image is consumed and released before this returns, whether or
    /// not the write succeeded.
    pub fn write(&self, frame: FrameImage, index: usize) -> AnimResult<RenderedFrame> {
        let path = self.folder.join(frame_file_name(index, &self.extension));
        if !self.enabled {
            return Err(AnimError::write(&path, "image output is disabled"));
        }
        let format = image_format(&self.extension).ok_or_else(|| {
            AnimError::write(&path, format!("unsupported image format '{}'", self.extension))
        })?;

        std::fs::create_dir_all(&self.folder).map_err(|e| AnimError::write(&self.folder, e))?;

        let date = frame.date();
        let image = DynamicImage::ImageRgba8(frame.into_image());
        let result = match format {
            // No alpha channel in JPEG.
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(&path, format)
            }
            _ => image.save_with_format(&path, format),
        };
        result.map_err(|e| AnimError::write(&path, e))?;

        debug!(index, %date, path = %path.display(), "Wrote frame");
        Ok(RenderedFrame { index, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_file_name_is_zero_padded() {
        assert_eq!(frame_file_name(0, "png"), "frame_000.png");
        assert_eq!(frame_file_name(42, "jpg"), "frame_042.jpg");
        assert_eq!(frame_file_name(1234, "png"), "frame_1234.png");
    }

    #[test]
    fn test_image_format() {
        assert_eq!(image_format("png"), Some(ImageFormat::Png));
        assert_eq!(image_format("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(image_format(".jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(image_format("svg"), None);
    }

    #[test]
    fn test_sequence_indices() {
        let mut seq = FrameSequence::new();
        assert!(seq.is_empty());
        for i in 0..3 {
            let index = seq.next_index();
            assert_eq!(index, i);
            seq.push(RenderedFrame {
                index,
                path: PathBuf::from(frame_file_name(index, "png")),
            });
        }
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.paths()[2], PathBuf::from("frame_002.png"));
    }
}
