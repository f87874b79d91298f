use crate::encode::strategy::{EncodeJob, EncodeStrategy};
use crate::foundation::core::FRAME_PATTERN;
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const MANIFEST_NAME: &str = "frames.txt";

/// A resolved `ffmpeg` binary plus the per-attempt wall-clock budget.
#[derive(Clone, Debug)]
pub struct FfmpegInvoker {
    pub bin: PathBuf,
    pub timeout: Duration,
}

impl FfmpegInvoker {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    /// Base command for one invocation, with overwrite enabled.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("-y");
        cmd
    }

    /// Run `cmd` under this invoker's timeout.
    pub fn run(&self, cmd: Command) -> ClipforgeResult<()> {
        run_with_timeout(cmd, self.timeout)
    }
}

/// Spawn `cmd`, waiting at most `timeout`. A process still running at the deadline is killed
/// and reaped before the error is returned.
pub(crate) fn run_with_timeout(mut cmd: Command, timeout: Duration) -> ClipforgeResult<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        ClipforgeError::encoding(format!(
            "failed to spawn '{program}' (is it installed and on PATH?): {e}"
        ))
    })?;

    let stderr_drain = child.stderr.take().map(|mut stderr| {
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes).map(|_| bytes)
        })
    });

    let deadline = Instant::now() + timeout;
    let status: Option<ExitStatus> = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) if Instant::now() >= deadline => break None,
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ClipforgeError::encoding(format!(
                    "failed to wait for '{program}': {e}"
                )));
            }
        }
    };

    let Some(status) = status else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(ClipforgeError::encoding(format!(
            "'{program}' timed out after {:.1}s and was killed",
            timeout.as_secs_f64()
        )));
    };

    let stderr_bytes = match stderr_drain {
        Some(handle) => handle
            .join()
            .map_err(|_| ClipforgeError::encoding("stderr drain thread panicked"))?
            .unwrap_or_default(),
        None => Vec::new(),
    };

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr_bytes);
        return Err(ClipforgeError::encoding(format!(
            "'{program}' exited with status {status}: {}",
            stderr.trim()
        )));
    }
    Ok(())
}

/// Encode from a concat-demuxer manifest listing every frame with a `1/fps` display duration.
#[derive(Clone, Debug)]
pub struct ConcatManifestStrategy {
    ffmpeg: FfmpegInvoker,
}

impl ConcatManifestStrategy {
    pub fn new(ffmpeg: FfmpegInvoker) -> Self {
        Self { ffmpeg }
    }
}

impl EncodeStrategy for ConcatManifestStrategy {
    fn name(&self) -> &str {
        "concat_manifest"
    }

    fn encode(&self, job: &EncodeJob<'_>) -> ClipforgeResult<()> {
        let manifest = job.work_dir.join(MANIFEST_NAME);
        write_concat_manifest(job, &manifest)?;
        ensure_parent_dir(job.output_path)?;

        let mut cmd = self.ffmpeg.command();
        cmd.args(["-f", "concat", "-safe", "0", "-i"])
            .arg(&manifest)
            .arg("-vf")
            .arg(format!("fps={}", job.frames.fps))
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(job.output_path);
        self.ffmpeg.run(cmd)
    }
}

/// Encode from the fixed-width `frame_%06d.png` numbering in the frame directory.
#[derive(Clone, Debug)]
pub struct NumberedSequenceStrategy {
    ffmpeg: FfmpegInvoker,
}

impl NumberedSequenceStrategy {
    pub fn new(ffmpeg: FfmpegInvoker) -> Self {
        Self { ffmpeg }
    }
}

impl EncodeStrategy for NumberedSequenceStrategy {
    fn name(&self) -> &str {
        "numbered_sequence"
    }

    fn encode(&self, job: &EncodeJob<'_>) -> ClipforgeResult<()> {
        ensure_parent_dir(job.output_path)?;
        let pattern = job.frames.dir.join(FRAME_PATTERN);
        let start = job
            .frames
            .frames
            .first()
            .map(|f| f.index.0)
            .unwrap_or(0)
            .to_string();

        let mut cmd = self.ffmpeg.command();
        cmd.arg("-r")
            .arg(job.frames.fps.to_string())
            .arg("-start_number")
            .arg(start)
            .arg("-i")
            .arg(&pattern)
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(job.output_path);
        self.ffmpeg.run(cmd)
    }
}

/// Write the concat-demuxer manifest: one `file` + `duration` pair per frame.
pub(crate) fn write_concat_manifest(job: &EncodeJob<'_>, path: &Path) -> ClipforgeResult<()> {
    let fps = job.frames.fps;
    if fps == 0 {
        return Err(ClipforgeError::encoding("fps must be > 0"));
    }
    let frame_duration = 1.0 / f64::from(fps);

    let mut out = String::new();
    for frame in &job.frames.frames {
        let p = std::path::absolute(&frame.path).unwrap_or_else(|_| frame.path.clone());
        out.push_str(&format!(
            "file '{}'\nduration {frame_duration}\n",
            escape_manifest_path(&p.to_string_lossy())
        ));
    }

    let mut f = std::fs::File::create(path).map_err(|e| {
        ClipforgeError::io(format!("create manifest '{}': {e}", path.display()))
    })?;
    f.write_all(out.as_bytes())
        .map_err(|e| ClipforgeError::io(format!("write manifest '{}': {e}", path.display())))
}

fn escape_manifest_path(p: &str) -> String {
    p.replace('\'', "'\\''")
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ClipforgeResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `bin -version` runs successfully.
pub fn is_ffmpeg_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
