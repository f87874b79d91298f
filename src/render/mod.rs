//! Frame compositor: rasterizes each scene's elements onto a black canvas and writes one PNG
//! per frame.

pub(crate) mod color;
pub mod compositor;
pub mod config;
pub mod cpu;
pub(crate) mod text;

pub use compositor::{
    CompositorOpts, FrameArtifact, FrameJob, FrameSequence, composite, frames_for_duration,
    plan_frames,
};
pub use config::RenderConfig;
pub use cpu::FrameRenderer;
