use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::render::compositor::FrameSequence;
use base64::Engine as _;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Prefix of every embedded frame; the thumbnail extractor searches for it.
pub const FRAME_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// User-facing note attached to every degraded result.
pub const DEGRADED_MESSAGE: &str =
    "Video generated as HTML preview. Install FFmpeg for MP4 generation.";

/// A written HTML preview.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlPreview {
    pub path: PathBuf,
    /// Frames actually embedded.
    pub embedded_frames: usize,
    /// Delay between embedded frames during playback, in milliseconds.
    pub frame_delay_ms: f64,
}

/// Where the degraded document for `output_path` is written: same stem, `.html` extension.
pub fn preview_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("html")
}

/// Positions picked when sampling at most `max` of `len` frames spread across the whole run.
pub fn sample_positions(len: usize, max: usize) -> Vec<usize> {
    let max = max.min(len);
    (0..max).map(|i| i * len / max).collect()
}

/// Write a self-contained HTML player embedding an evenly subsampled set of frames.
///
/// Unreadable frames are skipped. Fails when no frame could be embedded or the document cannot
/// be written.
#[tracing::instrument(skip_all, fields(frames = frames.len(), max_frames))]
pub fn write_html_preview(
    frames: &FrameSequence,
    output_path: &Path,
    max_frames: usize,
) -> ClipforgeResult<HtmlPreview> {
    let engine = base64::engine::general_purpose::STANDARD;
    let mut data_uris = Vec::new();
    for pos in sample_positions(frames.len(), max_frames.max(1)) {
        let frame = &frames.frames[pos];
        match std::fs::read(&frame.path) {
            Ok(bytes) => data_uris.push(format!("{FRAME_DATA_URI_PREFIX}{}", engine.encode(bytes))),
            Err(e) => {
                tracing::warn!(frame = %frame.path.display(), "failed to embed frame: {e}");
            }
        }
    }
    if data_uris.is_empty() {
        return Err(ClipforgeError::io("no frames could be embedded in the preview"));
    }

    let frame_delay_ms = frames.total_duration / data_uris.len() as f64 * 1000.0;
    let html = render_document(frames, &data_uris, frame_delay_ms);

    let path = preview_path(output_path);
    super::ffmpeg::ensure_parent_dir(&path)?;
    std::fs::write(&path, html)
        .map_err(|e| ClipforgeError::io(format!("write preview '{}': {e}", path.display())))?;

    tracing::info!(path = %path.display(), embedded = data_uris.len(), "wrote html preview");
    Ok(HtmlPreview {
        path,
        embedded_frames: data_uris.len(),
        frame_delay_ms,
    })
}

fn render_document(frames: &FrameSequence, data_uris: &[String], frame_delay_ms: f64) -> String {
    let res = frames.resolution;
    let mut img_tags = String::new();
    for (i, uri) in data_uris.iter().enumerate() {
        let active = if i == 0 { " active" } else { "" };
        let _ = writeln!(
            img_tags,
            r#"      <img class="frame{active}" src="{uri}" alt="Frame {}">"#,
            i + 1
        );
    }
    let total = data_uris.len();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Video preview</title>
  <style>
    body {{ background: #111; color: #eee; font-family: sans-serif; margin: 0; padding: 24px; }}
    .player {{ max-width: {width}px; margin: 0 auto; }}
    .stage {{ position: relative; aspect-ratio: {width} / {height}; background: #000; }}
    .frame {{ position: absolute; inset: 0; width: 100%; height: 100%; display: none; }}
    .frame.active {{ display: block; }}
    .progress {{ height: 4px; background: #333; margin-top: 8px; }}
    .progress-fill {{ height: 100%; width: 0; background: #4a9eff; }}
    .controls {{ margin-top: 12px; display: flex; gap: 8px; align-items: center; }}
    .note {{ margin-top: 16px; color: #999; font-size: 14px; }}
  </style>
</head>
<body>
  <div class="player">
    <div class="stage">
{img_tags}    </div>
    <div class="progress"><div class="progress-fill" id="progressFill"></div></div>
    <div class="controls">
      <button onclick="prevFrame()">Previous</button>
      <button onclick="playPause()" id="playBtn">Play</button>
      <button onclick="nextFrame()">Next</button>
      <span id="frameInfo">Frame 1 of {total}</span>
    </div>
    <p class="note">{message} {rendered} frames rendered at {fps} fps ({width}x{height}), {duration:.2}s total.</p>
  </div>
  <script>
    let currentFrame = 0;
    let isPlaying = false;
    let timer = null;
    const totalFrames = {total};
    const frameDuration = {frame_delay_ms};

    function showFrame(index) {{
      const frames = document.querySelectorAll('.frame');
      frames.forEach(f => f.classList.remove('active'));
      if (frames[index]) frames[index].classList.add('active');
      document.getElementById('frameInfo').textContent = `Frame ${{index + 1}} of ${{totalFrames}}`;
      document.getElementById('progressFill').style.width = ((index + 1) / totalFrames * 100) + '%';
    }}
    function nextFrame() {{
      currentFrame = (currentFrame + 1) % totalFrames;
      showFrame(currentFrame);
    }}
    function prevFrame() {{
      currentFrame = (currentFrame - 1 + totalFrames) % totalFrames;
      showFrame(currentFrame);
    }}
    function playPause() {{
      const btn = document.getElementById('playBtn');
      if (isPlaying) {{
        clearInterval(timer);
        btn.textContent = 'Play';
      }} else {{
        timer = setInterval(nextFrame, frameDuration);
        btn.textContent = 'Pause';
      }}
      isPlaying = !isPlaying;
    }}
    showFrame(0);
  </script>
</body>
</html>
"#,
        width = res.width,
        height = res.height,
        message = DEGRADED_MESSAGE,
        rendered = frames.len(),
        fps = frames.fps,
        duration = frames.total_duration,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/encode/degraded.rs"]
mod tests;
