//! Best-effort still extraction from a finished artifact.

use crate::encode::degraded::FRAME_DATA_URI_PREFIX;
use crate::encode::ffmpeg::{FfmpegInvoker, ensure_parent_dir};
use crate::encode::orchestrator::ArtifactFormat;
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use base64::Engine as _;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Thumbnail settings.
#[derive(Clone, Debug)]
pub struct ThumbnailOpts {
    pub ffmpeg_bin: PathBuf,
    /// Output width in pixels; height follows the source aspect ratio.
    pub max_width: u32,
    pub timeout: Duration,
}

impl Default for ThumbnailOpts {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            max_width: 320,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Result of one extraction attempt. `thumbnail_path` is `None` whenever `success` is false.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThumbnailOutcome {
    pub success: bool,
    pub thumbnail_path: Option<PathBuf>,
}

impl ThumbnailOutcome {
    fn failed() -> Self {
        Self {
            success: false,
            thumbnail_path: None,
        }
    }
}

/// `<dir>/<stem>_thumb.jpg` next to the artifact.
pub fn thumbnail_path_for(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_owned());
    artifact.with_file_name(format!("{stem}_thumb.jpg"))
}

#[derive(Clone, Debug, Default)]
pub struct ThumbnailExtractor {
    opts: ThumbnailOpts,
}

impl ThumbnailExtractor {
    pub fn new(opts: ThumbnailOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> &ThumbnailOpts {
        &self.opts
    }

    /// Single attempt; never fails the caller.
    #[tracing::instrument(skip(self), fields(artifact = %artifact.display()))]
    pub fn extract(&self, artifact: &Path, format: ArtifactFormat) -> ThumbnailOutcome {
        let out = thumbnail_path_for(artifact);
        let result = match format {
            ArtifactFormat::Native => self.extract_native(artifact, &out),
            ArtifactFormat::Degraded => self.extract_degraded(artifact, &out),
        };
        match result {
            Ok(()) if out.is_file() => ThumbnailOutcome {
                success: true,
                thumbnail_path: Some(out),
            },
            Ok(()) => {
                tracing::warn!("thumbnail step produced no file");
                ThumbnailOutcome::failed()
            }
            Err(e) => {
                tracing::warn!("thumbnail extraction failed: {e}");
                ThumbnailOutcome::failed()
            }
        }
    }

    fn extract_native(&self, artifact: &Path, out: &Path) -> ClipforgeResult<()> {
        ensure_parent_dir(out)?;
        let ffmpeg = FfmpegInvoker::new(self.opts.ffmpeg_bin.clone(), self.opts.timeout);
        let mut cmd = ffmpeg.command();
        cmd.arg("-i")
            .arg(artifact)
            .args(["-ss", "0", "-frames:v", "1", "-vf"])
            .arg(format!("scale={}:-1", self.opts.max_width))
            .arg(out);
        ffmpeg
            .run(cmd)
            .map_err(|e| ClipforgeError::thumbnail(e.to_string()))
    }

    /// Decode the first embedded frame of an HTML preview and save a scaled JPEG.
    fn extract_degraded(&self, artifact: &Path, out: &Path) -> ClipforgeResult<()> {
        let html = std::fs::read_to_string(artifact).map_err(|e| {
            ClipforgeError::thumbnail(format!("read preview '{}': {e}", artifact.display()))
        })?;
        let bytes = first_embedded_frame(&html)?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| ClipforgeError::thumbnail(format!("decode embedded frame: {e}")))?;

        let w = self.opts.max_width.max(1);
        let h = ((u64::from(img.height()) * u64::from(w)) / u64::from(img.width().max(1))).max(1);
        let h = u32::try_from(h).map_err(|_| ClipforgeError::thumbnail("thumbnail too tall"))?;
        let thumb = img.resize_exact(w, h, image::imageops::FilterType::Triangle);

        ensure_parent_dir(out)?;
        thumb
            .to_rgb8()
            .save_with_format(out, image::ImageFormat::Jpeg)
            .map_err(|e| ClipforgeError::thumbnail(format!("write '{}': {e}", out.display())))
    }
}

pub(crate) fn first_embedded_frame(html: &str) -> ClipforgeResult<Vec<u8>> {
    let start = html
        .find(FRAME_DATA_URI_PREFIX)
        .map(|i| i + FRAME_DATA_URI_PREFIX.len())
        .ok_or_else(|| ClipforgeError::thumbnail("preview embeds no frames"))?;
    let rest = &html[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    base64::engine::general_purpose::STANDARD
        .decode(&rest[..end])
        .map_err(|e| ClipforgeError::thumbnail(format!("embedded frame is not base64: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/thumbnail.rs"]
mod tests;
