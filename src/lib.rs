//! Clipforge turns declarative video templates into rendered artifacts.
//!
//! The pipeline has four stages:
//!
//! - Customize a [`Template`] with a [`CustomizationRequest`] (validated, never mutating the
//!   template)
//! - Composite the derived scene graph into PNG frames on the CPU
//! - Encode frames with `ffmpeg`, falling back to a self-contained HTML preview
//! - Extract a thumbnail from the finished artifact
//!
//! [`RenderSession`] runs the last three stages and reports the `queued → processing →
//! completed | failed` state machine to a [`RenderObserver`].
#![forbid(unsafe_code)]

mod foundation;

/// Template customization: validation, merge and preview.
pub mod customize;
/// Native encoder strategies and the degraded HTML fallback.
pub mod encode;
/// CPU frame compositing.
pub mod render;
/// Boundary scene graph model.
pub mod scene;
/// End-to-end render pipeline.
pub mod session;
/// Best-effort thumbnail extraction.
pub mod thumbnail;

pub use crate::foundation::core::{
    AspectRatio, FRAME_PATTERN, FrameIndex, Resolution,
};
pub use crate::foundation::error::{ClipforgeError, ClipforgeResult};

pub use crate::customize::{
    CustomizableElement, CustomizationRequest, Customized, ValidationIssue, ValidationReport,
    customizable_elements, customize, customize_validated, preview, validate,
};
pub use crate::encode::{
    ArtifactFormat, EncodeOutcome, EncodeStrategy, EncoderOpts, EncoderOrchestrator,
};
pub use crate::render::{CompositorOpts, FrameSequence, RenderConfig, composite};
pub use crate::scene::model::{Element, Scene, Template};
pub use crate::scene::props::{ElementKind, ElementProps};
pub use crate::scene::synthesize::{GenerationRequest, GenerationType, synthesize};
pub use crate::session::{
    RenderObserver, RenderRecord, RenderSession, RenderStage, RenderStatus, SessionOpts,
};
pub use crate::thumbnail::{ThumbnailExtractor, ThumbnailOpts, ThumbnailOutcome};
