use super::*;

#[test]
fn frame_file_names_are_fixed_width() {
    assert_eq!(FrameIndex(0).file_name(), "frame_000000.png");
    assert_eq!(FrameIndex(42).file_name(), "frame_000042.png");
    assert_eq!(FRAME_PATTERN, "frame_%06d.png");
}

#[test]
fn aspect_ratio_resolutions() {
    assert_eq!(AspectRatio::Landscape.resolution(), Resolution::new(1280, 720));
    assert_eq!(AspectRatio::Portrait.resolution(), Resolution::new(720, 1280));
    assert_eq!(AspectRatio::Square.resolution(), Resolution::new(720, 720));
    assert_eq!(AspectRatio::Widescreen.resolution(), Resolution::new(1280, 540));
}

#[test]
fn aspect_ratio_parses_wire_labels() {
    for r in AspectRatio::ALL {
        assert_eq!(r.as_str().parse::<AspectRatio>().unwrap(), r);
    }
    let err = "4:3".parse::<AspectRatio>().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("4:3"));
    assert!(msg.contains("16:9, 9:16, 1:1, 21:9"));
}

#[test]
fn aspect_ratio_serializes_as_label() {
    let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
    assert_eq!(json, "\"9:16\"");
    let back: AspectRatio = serde_json::from_str("\"21:9\"").unwrap();
    assert_eq!(back, AspectRatio::Widescreen);
    assert!(serde_json::from_str::<AspectRatio>("\"4:3\"").is_err());
}

#[test]
fn resolution_display() {
    assert_eq!(Resolution::new(1280, 720).to_string(), "1280x720");
    assert_eq!(AspectRatio::default(), AspectRatio::Landscape);
}
