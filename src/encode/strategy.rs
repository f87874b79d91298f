use crate::foundation::error::ClipforgeResult;
use crate::render::compositor::FrameSequence;
use std::path::Path;

/// Inputs handed to every encode attempt.
#[derive(Debug, Clone, Copy)]
pub struct EncodeJob<'a> {
    /// Frames in playback order.
    pub frames: &'a FrameSequence,
    /// Target container path.
    pub output_path: &'a Path,
    /// Scratch directory for manifests and other intermediate files.
    pub work_dir: &'a Path,
}

/// One way of turning a frame sequence into a native video file.
///
/// Implementations report failure through `Err`; the orchestrator additionally requires the
/// output file to exist before counting an attempt as a success.
pub trait EncodeStrategy: Send + Sync {
    /// Short name used in logs and artifact metadata.
    fn name(&self) -> &str;
    /// Run a single attempt.
    fn encode(&self, job: &EncodeJob<'_>) -> ClipforgeResult<()>;
}
