//! GIF assembly from written frames.
//!
//! The animation is encoded into a temporary file next to the output and
//! only moved into place once every frame has been added, so a failed run
//! never leaves a truncated GIF behind.

use std::path::{Path, PathBuf};

use anim_common::{AnimError, AnimResult};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use tracing::{debug, info};

use crate::progress::progress_bar;
use crate::writer::FrameSequence;

/// NeuQuant sampling factor: 1 is best quality, 30 fastest.
const QUANTIZE_SPEED: i32 = 10;

/// Combines frame images into a looping GIF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationAssembler {
    frame_duration_secs: f64,
    loop_count: u16,
}

impl AnimationAssembler {
    /// `frame_duration_secs` is the display time of each frame; a
    /// `loop_count` of 0 repeats forever.
    pub fn new(frame_duration_secs: f64, loop_count: u16) -> Self {
        Self {
            frame_duration_secs: frame_duration_secs.max(0.0),
            loop_count,
        }
    }

    /// Per-frame delay in milliseconds.
    pub fn delay_ms(&self) -> u32 {
        (self.frame_duration_secs * 1000.0).round() as u32
    }

    pub fn repeat(&self) -> Repeat {
        match self.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        }
    }

    /// Assemble the frames of `sequence` in order.
    pub fn assemble_sequence(&self, sequence: &FrameSequence, output: &Path) -> AnimResult<()> {
        self.assemble(&sequence.paths(), output)
    }

    /// Assemble `frames` in order into the GIF at `output`.
    pub fn assemble(&self, frames: &[PathBuf], output: &Path) -> AnimResult<()> {
        if frames.is_empty() {
            return Err(AnimError::assembly("no frames to assemble"));
        }

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| AnimError::assembly(format!("cannot create {}: {}", dir.display(), e)))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".animation-")
            .suffix(".gif.part")
            .tempfile_in(&dir)
            .map_err(|e| AnimError::assembly(format!("cannot create temporary file in {}: {}", dir.display(), e)))?;

        let pb = progress_bar(frames.len(), "Creating GIF");
        let delay = Delay::from_numer_denom_ms(self.delay_ms(), 1);
        {
            let mut encoder = GifEncoder::new_with_speed(tmp.as_file_mut(), QUANTIZE_SPEED);
            encoder
                .set_repeat(self.repeat())
                .map_err(|e| AnimError::assembly(format!("cannot set loop count: {}", e)))?;

            let mut expected = None;
            for path in frames {
                let image = image::open(path)
                    .map_err(|e| AnimError::assembly(format!("cannot read frame {}: {}", path.display(), e)))?
                    .to_rgba8();

                let dims = image.dimensions();
                match expected {
                    None => expected = Some(dims),
                    Some(first) if first != dims => {
                        return Err(AnimError::assembly(format!(
                            "frame {} is {}x{}, expected {}x{}",
                            path.display(),
                            dims.0,
                            dims.1,
                            first.0,
                            first.1
                        )));
                    }
                    Some(_) => {}
                }

                encoder
                    .encode_frame(Frame::from_parts(image, 0, 0, delay))
                    .map_err(|e| AnimError::assembly(format!("cannot encode frame {}: {}", path.display(), e)))?;
                pb.inc(1);
            }
        }
        pb.finish_and_clear();

        tmp.persist(output)
            .map_err(|e| AnimError::assembly(format!("cannot move GIF to {}: {}", output.display(), e.error)))?;

        debug!(
            frames = frames.len(),
            delay_ms = self.delay_ms(),
            loop_count = self.loop_count,
            "Encoded GIF"
        );
        info!(path = %output.display(), frames = frames.len(), "Animation saved");
        Ok(())
    }
}
