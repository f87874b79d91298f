use crate::encode::degraded::{DEGRADED_MESSAGE, preview_path, write_html_preview};
use crate::encode::ffmpeg::{ConcatManifestStrategy, FfmpegInvoker, NumberedSequenceStrategy};
use crate::encode::strategy::{EncodeJob, EncodeStrategy};
use crate::foundation::core::Resolution;
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::render::compositor::FrameSequence;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`EncoderOpts::ffmpeg_bin`].
pub const FFMPEG_ENV: &str = "CLIPFORGE_FFMPEG";
/// Environment variable overriding [`EncoderOpts::attempt_timeout`], in whole seconds.
pub const ENCODE_TIMEOUT_ENV: &str = "CLIPFORGE_ENCODE_TIMEOUT_SECS";

/// Encoder settings.
#[derive(Clone, Debug)]
pub struct EncoderOpts {
    /// `ffmpeg` executable (name on `PATH` or absolute path).
    pub ffmpeg_bin: PathBuf,
    /// Wall-clock budget of each native attempt.
    pub attempt_timeout: Duration,
    /// Upper bound on frames embedded in a degraded preview.
    pub max_preview_frames: usize,
}

impl Default for EncoderOpts {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            attempt_timeout: Duration::from_secs(60),
            max_preview_frames: 10,
        }
    }
}

impl EncoderOpts {
    /// Defaults with `CLIPFORGE_FFMPEG` / `CLIPFORGE_ENCODE_TIMEOUT_SECS` applied.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(bin) = std::env::var_os(FFMPEG_ENV).filter(|v| !v.is_empty()) {
            opts.ffmpeg_bin = PathBuf::from(bin);
        }
        if let Ok(raw) = std::env::var(ENCODE_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => opts.attempt_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid {ENCODE_TIMEOUT_ENV}"),
            }
        }
        opts
    }

    pub(crate) fn invoker(&self) -> FfmpegInvoker {
        FfmpegInvoker::new(self.ffmpeg_bin.clone(), self.attempt_timeout)
    }
}

/// Kind of artifact produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// A native video container.
    Native,
    /// A self-contained HTML document with embedded sampled frames.
    Degraded,
}

impl ArtifactFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Degraded => "degraded",
        }
    }
}

/// Facts about the produced artifact.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtifactMetadata {
    pub frame_count: usize,
    pub fps: u32,
    pub resolution: Resolution,
    /// Seconds; sum of scene durations.
    pub duration: f64,
    /// Strategy that produced a native artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Frames embedded in a degraded artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_frames: Option<usize>,
    /// Failure of every native attempt, in priority order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempt_errors: Vec<String>,
}

/// Result of [`EncoderOrchestrator::encode`].
///
/// An `Err` from `encode` is the `success = false` case: only the degraded write can cause it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncodeOutcome {
    pub success: bool,
    pub output_path: PathBuf,
    pub format: ArtifactFormat,
    pub metadata: ArtifactMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Tries native strategies in priority order and falls back to the degraded HTML preview.
pub struct EncoderOrchestrator {
    strategies: Vec<Box<dyn EncodeStrategy>>,
    opts: EncoderOpts,
}

impl EncoderOrchestrator {
    /// Concat-manifest first, then numbered-sequence, both through `opts.ffmpeg_bin`.
    pub fn new(opts: EncoderOpts) -> Self {
        let strategies: Vec<Box<dyn EncodeStrategy>> = vec![
            Box::new(ConcatManifestStrategy::new(opts.invoker())),
            Box::new(NumberedSequenceStrategy::new(opts.invoker())),
        ];
        Self { strategies, opts }
    }

    /// Use an explicit strategy list (tried in the given order).
    pub fn with_strategies(strategies: Vec<Box<dyn EncodeStrategy>>, opts: EncoderOpts) -> Self {
        Self { strategies, opts }
    }

    pub fn opts(&self) -> &EncoderOpts {
        &self.opts
    }

    pub fn strategy_names(&self) -> impl Iterator<Item = &str> {
        self.strategies.iter().map(|s| s.name())
    }

    /// Encode `frames` to `output_path`; `work_dir` holds intermediate files.
    #[tracing::instrument(skip_all, fields(frames = frames.len(), output = %output_path.display()))]
    pub fn encode(
        &self,
        frames: &FrameSequence,
        output_path: &Path,
        work_dir: &Path,
    ) -> ClipforgeResult<EncodeOutcome> {
        if frames.is_empty() {
            return Err(ClipforgeError::encoding("no frames to encode"));
        }
        let job = EncodeJob {
            frames,
            output_path,
            work_dir,
        };

        let mut attempt_errors = Vec::new();
        for strategy in &self.strategies {
            let name = strategy.name();
            tracing::debug!(strategy = name, "encode attempt");
            let result = strategy.encode(&job).and_then(|()| {
                if output_path.is_file() {
                    Ok(())
                } else {
                    Err(ClipforgeError::encoding(format!(
                        "{name} reported success but '{}' does not exist",
                        output_path.display()
                    )))
                }
            });
            match result {
                Ok(()) => {
                    tracing::info!(strategy = name, "native encode succeeded");
                    return Ok(EncodeOutcome {
                        success: true,
                        output_path: output_path.to_path_buf(),
                        format: ArtifactFormat::Native,
                        metadata: self.metadata(frames, Some(name.to_owned()), None, attempt_errors),
                        message: None,
                    });
                }
                Err(e) => {
                    tracing::warn!(strategy = name, "encode attempt failed: {e}");
                    attempt_errors.push(format!("{name}: {e}"));
                }
            }
        }

        tracing::warn!("no native encoder succeeded; writing html preview");
        remove_partial_output(output_path);
        let preview = write_html_preview(frames, output_path, self.opts.max_preview_frames)?;
        Ok(EncodeOutcome {
            success: true,
            output_path: preview.path,
            format: ArtifactFormat::Degraded,
            metadata: self.metadata(frames, None, Some(preview.embedded_frames), attempt_errors),
            message: Some(DEGRADED_MESSAGE.to_owned()),
        })
    }

    fn metadata(
        &self,
        frames: &FrameSequence,
        strategy: Option<String>,
        embedded_frames: Option<usize>,
        attempt_errors: Vec<String>,
    ) -> ArtifactMetadata {
        ArtifactMetadata {
            frame_count: frames.len(),
            fps: frames.fps,
            resolution: frames.resolution,
            duration: frames.total_duration,
            strategy,
            embedded_frames,
            attempt_errors,
        }
    }
}

impl Default for EncoderOrchestrator {
    fn default() -> Self {
        Self::new(EncoderOpts::default())
    }
}

/// Drop whatever a failed attempt left at `output_path` so it is not mistaken for a video.
fn remove_partial_output(output_path: &Path) {
    if output_path.is_file()
        && output_path != preview_path(output_path)
        && let Err(e) = std::fs::remove_file(output_path)
    {
        tracing::warn!(path = %output_path.display(), "failed to remove partial output: {e}");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/orchestrator.rs"]
mod tests;
