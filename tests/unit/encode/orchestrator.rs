use super::*;
use crate::foundation::core::FrameIndex;
use crate::render::compositor::FrameArtifact;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Failing {
    calls: Arc<AtomicUsize>,
}

impl EncodeStrategy for Failing {
    fn name(&self) -> &str {
        "failing"
    }
    fn encode(&self, _job: &EncodeJob<'_>) -> ClipforgeResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClipforgeError::encoding("encoder not installed"))
    }
}

/// Reports success without producing a file.
struct Lying;

impl EncodeStrategy for Lying {
    fn name(&self) -> &str {
        "lying"
    }
    fn encode(&self, _job: &EncodeJob<'_>) -> ClipforgeResult<()> {
        Ok(())
    }
}

struct Writing;

impl EncodeStrategy for Writing {
    fn name(&self) -> &str {
        "writing"
    }
    fn encode(&self, job: &EncodeJob<'_>) -> ClipforgeResult<()> {
        std::fs::write(job.output_path, b"not really mp4").map_err(|e| ClipforgeError::io(e.to_string()))
    }
}

/// Leaves a truncated file behind, then fails.
struct Truncating;

impl EncodeStrategy for Truncating {
    fn name(&self) -> &str {
        "truncating"
    }
    fn encode(&self, job: &EncodeJob<'_>) -> ClipforgeResult<()> {
        std::fs::write(job.output_path, b"\x00\x00\x00\x18ftyp")
            .map_err(|e| ClipforgeError::io(e.to_string()))?;
        Err(ClipforgeError::encoding("ffmpeg exited with status 1"))
    }
}

fn frames(dir: &Path, n: u64) -> FrameSequence {
    let mut out = Vec::new();
    for i in 0..n {
        let path = dir.join(FrameIndex(i).file_name());
        image::RgbaImage::new(4, 4).save(&path).unwrap();
        out.push(FrameArtifact {
            index: FrameIndex(i),
            scene_index: 0,
            path,
        });
    }
    FrameSequence {
        frames: out,
        dir: dir.to_path_buf(),
        fps: 30,
        resolution: Resolution::new(1280, 720),
        total_duration: n as f64 / 30.0,
    }
}

#[test]
fn all_strategies_failing_yields_degraded_success() {
    let dir = tempfile::tempdir().unwrap();
    let seq = frames(dir.path(), 12);
    let calls = Arc::new(AtomicUsize::new(0));
    let orch = EncoderOrchestrator::with_strategies(
        vec![
            Box::new(Failing { calls: calls.clone() }),
            Box::new(Lying),
            Box::new(Failing { calls: calls.clone() }),
        ],
        EncoderOpts::default(),
    );

    let out = orch
        .encode(&seq, &dir.path().join("video.mp4"), dir.path())
        .unwrap();
    assert!(out.success);
    assert_eq!(out.format, ArtifactFormat::Degraded);
    assert_eq!(out.output_path, dir.path().join("video.html"));
    assert!(std::fs::metadata(&out.output_path).unwrap().len() > 0);
    assert_eq!(out.message.as_deref(), Some(DEGRADED_MESSAGE));
    assert_eq!(out.metadata.embedded_frames, Some(10));
    assert_eq!(out.metadata.attempt_errors.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn partial_native_output_is_removed_before_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let seq = frames(dir.path(), 4);
    let orch =
        EncoderOrchestrator::with_strategies(vec![Box::new(Truncating)], EncoderOpts::default());

    let target = dir.path().join("video.mp4");
    let out = orch.encode(&seq, &target, dir.path()).unwrap();
    assert_eq!(out.format, ArtifactFormat::Degraded);
    assert!(!target.exists());
    assert!(out.output_path.is_file());
}

#[test]
fn first_successful_strategy_wins() {
    let dir = tempfile::tempdir().unwrap();
    let seq = frames(dir.path(), 3);
    let calls = Arc::new(AtomicUsize::new(0));
    let orch = EncoderOrchestrator::with_strategies(
        vec![
            Box::new(Failing { calls: calls.clone() }),
            Box::new(Writing),
            Box::new(Failing { calls: calls.clone() }),
        ],
        EncoderOpts::default(),
    );

    let target = dir.path().join("video.mp4");
    let out = orch.encode(&seq, &target, dir.path()).unwrap();
    assert_eq!(out.format, ArtifactFormat::Native);
    assert_eq!(out.output_path, target);
    assert_eq!(out.metadata.strategy.as_deref(), Some("writing"));
    assert_eq!(out.metadata.frame_count, 3);
    assert!(out.message.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn default_orchestrator_tries_manifest_then_sequence() {
    let orch = EncoderOrchestrator::default();
    let names: Vec<_> = orch.strategy_names().collect();
    assert_eq!(names, ["concat_manifest", "numbered_sequence"]);
    assert_eq!(orch.opts().attempt_timeout, Duration::from_secs(60));
}

#[test]
fn empty_sequence_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let seq = frames(dir.path(), 0);
    let orch = EncoderOrchestrator::with_strategies(Vec::new(), EncoderOpts::default());
    assert!(orch.encode(&seq, &dir.path().join("v.mp4"), dir.path()).is_err());
}

#[test]
fn degraded_write_failure_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let seq = frames(dir.path(), 2);
    // A regular file where the output directory should be.
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, b"x").unwrap();
    let orch = EncoderOrchestrator::with_strategies(Vec::new(), EncoderOpts::default());
    assert!(orch.encode(&seq, &blocker.join("v.mp4"), dir.path()).is_err());
}
