//! Frame persistence and animation assembly.
//!
//! Rendered frames are written to numbered image files by [`FrameWriter`],
//! tracked in order by [`FrameSequence`], and combined into a looping GIF
//! by [`AnimationAssembler`].

pub mod gif;
pub mod progress;
pub mod writer;

pub use gif::AnimationAssembler;
pub use progress::progress_bar;
pub use writer::{FrameSequence, FrameWriter, RenderedFrame};
