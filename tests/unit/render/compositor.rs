use super::*;
use serde_json::json;

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
                    "id": format!("box_{i}"), "type": "shape",
                    "position": {"x": 10, "y": 10},
                    "size": {"width": 20, "height": 20},
                    "properties": {"fillColor": "#336699"},
                }],
            })
        })
        .collect();
    Template::from_value(json!({
        "duration": durations.iter().sum::<f64>(),
        "aspect_ratio": "1:1",
        "default_style": "minimalist",
        "scenes": scenes,
    }))
    .unwrap()
}

fn sequential() -> CompositorOpts {
    CompositorOpts {
        parallel: false,
        ..CompositorOpts::default()
    }
}

#[test]
fn frame_counts_round_to_nearest() {
    assert_eq!(frames_for_duration(1.0, 30), 30);
    assert_eq!(frames_for_duration(0.5, 25), 13);
    assert_eq!(frames_for_duration(0.01, 30), 0);
    assert_eq!(frames_for_duration(f64::NAN, 30), 0);
}

#[test]
fn plan_numbers_frames_across_scenes() {
    let jobs = plan_frames(&template(&[0.2, 0.1]), 10);
    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0], FrameJob { index: FrameIndex(0), scene_index: 0 });
    assert_eq!(jobs[2], FrameJob { index: FrameIndex(2), scene_index: 1 });
}

#[test]
fn composite_writes_one_png_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let t = template(&[0.2, 0.1]);
    let cfg = RenderConfig::for_template(&t).with_fps(10);
    let seq = composite(&t, &cfg, &sequential(), dir.path()).unwrap();

    assert_eq!(seq.len(), 3);
    assert_eq!(seq.resolution, Resolution::new(720, 720));
    assert!((seq.total_duration - 0.3).abs() < 1e-9);
    for (i, f) in seq.frames.iter().enumerate() {
        assert_eq!(f.index, FrameIndex(i as u64));
        assert_eq!(f.path, dir.path().join(format!("frame_{i:06}.png")));
        assert!(f.path.is_file());
    }
}

#[test]
fn parallel_and_sequential_agree_on_layout() {
    let t = template(&[0.3]);
    let cfg = RenderConfig::for_template(&t).with_fps(10);

    let seq_dir = tempfile::tempdir().unwrap();
    let par_dir = tempfile::tempdir().unwrap();
    let a = composite(&t, &cfg, &sequential(), seq_dir.path()).unwrap();
    let par_opts = CompositorOpts {
        threads: Some(2),
        chunk_size: 2,
        ..CompositorOpts::default()
    };
    let b = composite(&t, &cfg, &par_opts, par_dir.path()).unwrap();

    assert_eq!(a.len(), b.len());
    let ia = image::open(&a.frames[1].path).unwrap().to_rgba8();
    let ib = image::open(&b.frames[1].path).unwrap().to_rgba8();
    assert_eq!(ia.as_raw(), ib.as_raw());
}

#[test]
fn zero_length_render_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let t = template(&[0.0]);
    let err = composite(&t, &RenderConfig::default(), &sequential(), dir.path()).unwrap_err();
    assert!(err.to_string().contains("no frames generated"));
}

#[test]
fn zero_fps_and_zero_threads_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let t = template(&[1.0]);
    let cfg = RenderConfig::default().with_fps(0);
    assert!(composite(&t, &cfg, &sequential(), dir.path()).is_err());

    let opts = CompositorOpts {
        threads: Some(0),
        ..CompositorOpts::default()
    };
    assert!(composite(&t, &RenderConfig::default(), &opts, dir.path()).is_err());
}
