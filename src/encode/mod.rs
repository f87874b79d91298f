//! Encoder orchestrator: ordered native strategies with a degraded HTML preview fallback.

pub mod degraded;
pub mod ffmpeg;
pub mod orchestrator;
pub mod strategy;

pub use degraded::{DEGRADED_MESSAGE, HtmlPreview, write_html_preview};
pub use ffmpeg::{
    ConcatManifestStrategy, FfmpegInvoker, NumberedSequenceStrategy, is_ffmpeg_available,
};
pub use orchestrator::{
    ArtifactFormat, ArtifactMetadata, EncodeOutcome, EncoderOpts, EncoderOrchestrator,
};
pub use strategy::{EncodeJob, EncodeStrategy};
