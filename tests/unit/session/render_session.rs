use super::*;
use crate::encode::strategy::{EncodeJob, EncodeStrategy};
use crate::foundation::core::AspectRatio;
use serde_json::json;
use std::sync::Mutex;

struct NoEncoder;

impl EncodeStrategy for NoEncoder {
    fn name(&self) -> &str {
        "no_encoder"
    }
    fn encode(&self, _job: &EncodeJob<'_>) -> ClipforgeResult<()> {
        Err(ClipforgeError::encoding("ffmpeg not installed"))
    }
}

#[derive(Default)]
struct Recorder {
    statuses: Mutex<Vec<RenderStatus>>,
    stages: Mutex<Vec<RenderStage>>,
}

impl RenderObserver for Recorder {
    fn on_status(&self, _render_id: Uuid, status: RenderStatus) {
        self.statuses.lock().unwrap().push(status);
    }
    fn on_stage(&self, _render_id: Uuid, stage: RenderStage) {
        self.stages.lock().unwrap().push(stage);
    }
}

fn template(durations: &[f64]) -> Template {
    let scenes: Vec<_> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| {
            json!({
                "id": format!("scene_{i}"),
                "type": "main",
                "duration": d,
                "elements": [{
                    "id": "badge", "type": "shape",
                    "position": {"x": 10, "y": 10},
                    "size": {"width": 80, "height": 20},
                    "properties": {"shapeType": "circle", "fillColor": "#ffcc00"},
                }],
            })
        })
        .collect();
    Template::from_value(json!({
        "duration": durations.iter().sum::<f64>(),
        "aspect_ratio": "1:1",
        "default_style": "cinematic",
        "customizable_elements": ["badge"],
        "scenes": scenes,
    }))
    .unwrap()
}

fn session(scratch_root: &Path) -> (RenderSession, Arc<Recorder>) {
    let opts = SessionOpts {
        scratch_root: scratch_root.to_path_buf(),
        compositor: CompositorOpts {
            threads: Some(2),
            ..CompositorOpts::default()
        },
        ..SessionOpts::default()
    };
    let encoder =
        EncoderOrchestrator::with_strategies(vec![Box::new(NoEncoder)], opts.encoder.clone());
    let recorder = Arc::new(Recorder::default());
    let sess = RenderSession::with_components(opts, encoder, ThumbnailExtractor::default())
        .with_observer(recorder.clone());
    (sess, recorder)
}

fn config(fps: u32) -> RenderConfig {
    RenderConfig {
        aspect_ratio: AspectRatio::Square,
        fps,
        quality: "high".to_owned(),
    }
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[test]
fn degraded_render_completes_with_thumbnail_and_clean_scratch() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let (sess, rec) = session(scratch.path());

    let record = sess
        .render(&template(&[1.0, 1.0]), &config(4), &out.path().join("video.mp4"))
        .unwrap();

    assert_eq!(record.status, RenderStatus::Completed);
    assert_eq!(record.format, ArtifactFormat::Degraded);
    assert_eq!(record.output_path, out.path().join("video.html"));
    assert!(record.file_size > 0);
    assert_eq!(record.frame_count, 8);
    assert_eq!(record.fps, 4);
    assert_eq!(record.resolution, Resolution::new(720, 720));
    assert!((record.duration - 2.0).abs() < 1e-9);
    assert_eq!(record.quality, "high");
    assert_eq!(
        record.thumbnail_path.as_deref(),
        Some(out.path().join("video_thumb.jpg").as_path())
    );
    assert!(record.message.is_some());

    assert_eq!(
        *rec.statuses.lock().unwrap(),
        [RenderStatus::Queued, RenderStatus::Processing, RenderStatus::Completed]
    );
    assert_eq!(
        *rec.stages.lock().unwrap(),
        [RenderStage::Compositing, RenderStage::Encoding, RenderStage::Thumbnail]
    );
    assert_eq!(entries(scratch.path()), 0);
}

#[test]
fn malformed_graph_is_rejected_before_queueing() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let (sess, rec) = session(scratch.path());

    let mut t = template(&[1.0]);
    t.scenes[0].elements[0].size.width = 0.0;
    let err = sess
        .render(&t, &config(4), &out.path().join("video.mp4"))
        .unwrap_err();

    let report = err.report().unwrap();
    assert_eq!(report.errors[0].path, "scenes.scene_0.elements.badge.size");
    assert!(rec.statuses.lock().unwrap().is_empty());
    assert_eq!(entries(scratch.path()), 0);
    assert_eq!(entries(out.path()), 0);
}

#[test]
fn too_short_graph_is_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let (sess, rec) = session(scratch.path());
    let err = sess
        .render(&template(&[0.5]), &config(4), &scratch.path().join("v.mp4"))
        .unwrap_err();
    assert!(
        err.report()
            .unwrap()
            .error_messages()
            .any(|m| m.starts_with("Duration too short"))
    );
    assert!(rec.statuses.lock().unwrap().is_empty());
}

#[test]
fn unwritable_output_fails_and_still_cleans_up() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let blocker = out.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let (sess, rec) = session(scratch.path());

    let err = sess
        .render(&template(&[1.0]), &config(4), &blocker.join("video.mp4"))
        .unwrap_err();

    assert!(err.report().is_none());
    assert_eq!(
        *rec.statuses.lock().unwrap(),
        [RenderStatus::Queued, RenderStatus::Processing, RenderStatus::Failed]
    );
    assert_eq!(entries(scratch.path()), 0);
    assert_eq!(entries(out.path()), 1);
}

#[test]
fn invalid_config_is_rejected_before_queueing() {
    let scratch = tempfile::tempdir().unwrap();
    let (sess, rec) = session(scratch.path());
    let err = sess
        .render(&template(&[1.0]), &config(0), &scratch.path().join("v.mp4"))
        .unwrap_err();
    assert!(matches!(err, ClipforgeError::Validation(_)));
    assert!(rec.statuses.lock().unwrap().is_empty());
}

#[test]
fn rejected_customization_never_renders() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let (sess, rec) = session(scratch.path());
    let req = CustomizationRequest::from_value(json!({
        "elements": {"does_not_exist": {"properties": {"fillColor": "#000000"}}}
    }))
    .unwrap();

    let err = sess
        .render_customized(&template(&[1.0]), &req, None, &out.path().join("v.mp4"))
        .unwrap_err();
    let report = err.report().unwrap();
    assert!(!report.is_valid);
    assert!(rec.statuses.lock().unwrap().is_empty());
    assert_eq!(entries(out.path()), 0);
}

#[test]
fn customized_render_uses_rescaled_durations() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let (sess, _) = session(scratch.path());
    let req = CustomizationRequest::from_value(json!({
        "duration": 4.0,
        "elements": {"badge": {"properties": {"fillColor": "#00ccff"}}}
    }))
    .unwrap();

    let record = sess
        .render_customized(
            &template(&[1.0, 1.0]),
            &req,
            Some(config(4)),
            &out.path().join("v.mp4"),
        )
        .unwrap();
    assert_eq!(record.frame_count, 16);
    assert!((record.duration - 4.0).abs() < 1e-9);
}

#[test]
fn concurrent_renders_do_not_share_scratch_space() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let (sess, _) = session(scratch.path());
    let t = template(&[1.0]);

    let records: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..3)
            .map(|i| {
                let (sess, t, out) = (&sess, &t, out.path());
                s.spawn(move || sess.render(t, &config(4), &out.join(format!("v{i}.mp4"))))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    assert_eq!(records.len(), 3);
    let mut ids: Vec<_> = records.iter().map(|r| r.render_id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(records.iter().all(|r| r.frame_count == 4));
    assert_eq!(entries(scratch.path()), 0);
}

#[test]
fn out_of_range_fps_is_carried_as_a_warning() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let (sess, _) = session(scratch.path());
    let record = sess
        .render(&template(&[1.0]), &config(4), &out.path().join("v.mp4"))
        .unwrap();
    assert_eq!(record.frame_count, 4);
    assert!(record.warnings.iter().any(|w| w.contains("FPS 4")));
}

#[test]
fn artifact_check_rejects_missing_and_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(check_artifact(&dir.path().join("missing.mp4")).is_err());
    let empty = dir.path().join("empty.mp4");
    std::fs::write(&empty, b"").unwrap();
    assert!(check_artifact(&empty).is_err());
    std::fs::write(&empty, b"data").unwrap();
    assert_eq!(check_artifact(&empty).unwrap(), 4);
}
