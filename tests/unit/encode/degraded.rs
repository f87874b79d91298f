use super::*;
use crate::foundation::core::{FrameIndex, Resolution};
use crate::render::compositor::FrameArtifact;

fn write_frames(dir: &Path, n: u64) -> FrameSequence {
    let mut frames = Vec::new();
    for i in 0..n {
        let path = dir.join(FrameIndex(i).file_name());
        image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();
        frames.push(FrameArtifact {
            index: FrameIndex(i),
            scene_index: 0,
            path,
        });
    }
    FrameSequence {
        frames,
        dir: dir.to_path_buf(),
        fps: 10,
        resolution: Resolution::new(1280, 720),
        total_duration: n as f64 / 10.0,
    }
}

#[test]
fn sampling_spreads_over_the_whole_sequence() {
    assert_eq!(sample_positions(30, 10), vec![0, 3, 6, 9, 12, 15, 18, 21, 24, 27]);
    assert_eq!(sample_positions(25, 10), vec![0, 2, 5, 7, 10, 12, 15, 17, 20, 22]);
    assert_eq!(sample_positions(19, 10), vec![0, 1, 3, 5, 7, 9, 11, 13, 15, 17]);
    assert_eq!(sample_positions(4, 10), vec![0, 1, 2, 3]);
    assert!(sample_positions(0, 10).is_empty());
    assert!(sample_positions(5, 0).is_empty());
}

#[test]
fn sampling_reaches_the_last_stretch() {
    let len = 199;
    let picked = sample_positions(len, 10);
    assert_eq!(picked.len(), 10);
    assert!(*picked.last().unwrap() >= len - len / 10);
}

#[test]
fn preview_path_swaps_extension() {
    assert_eq!(
        preview_path(Path::new("/out/video.mp4")),
        PathBuf::from("/out/video.html")
    );
}

#[test]
fn preview_embeds_bounded_frames_and_player_state() {
    let dir = tempfile::tempdir().unwrap();
    let frames = write_frames(dir.path(), 20);
    let out = dir.path().join("render/video.mp4");

    let preview = write_html_preview(&frames, &out, 10).unwrap();
    assert_eq!(preview.path, dir.path().join("render/video.html"));
    assert_eq!(preview.embedded_frames, 10);
    assert!((preview.frame_delay_ms - 200.0).abs() < 1e-9);

    let html = std::fs::read_to_string(&preview.path).unwrap();
    assert_eq!(html.matches(FRAME_DATA_URI_PREFIX).count(), 10);
    assert!(html.contains("let currentFrame = 0;"));
    assert!(html.contains("const totalFrames = 10;"));
    assert!(html.contains("function playPause()"));
    assert!(html.contains(DEGRADED_MESSAGE));
}

#[test]
fn unreadable_frames_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut frames = write_frames(dir.path(), 3);
    std::fs::remove_file(&frames.frames[1].path).unwrap();
    let preview = write_html_preview(&frames, &dir.path().join("v.mp4"), 10).unwrap();
    assert_eq!(preview.embedded_frames, 2);

    for f in &frames.frames {
        let _ = std::fs::remove_file(&f.path);
    }
    frames.frames.truncate(2);
    assert!(write_html_preview(&frames, &dir.path().join("w.mp4"), 10).is_err());
}
