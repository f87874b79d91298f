use super::*;
use crate::scene::props::ElementKind;

#[test]
fn text_to_video_shows_the_prompt() {
    let req = GenerationRequest {
        generation_type: GenerationType::TextToVideo,
        duration: Some(8.0),
        aspect_ratio: Some(AspectRatio::Portrait),
        text_prompt: Some("Launch day".to_owned()),
        images: Vec::new(),
    };
    let t = synthesize(&req);
    assert_eq!(t.aspect_ratio, AspectRatio::Portrait);
    assert_eq!(t.scenes.len(), 1);
    assert_eq!(t.duration, 8.0);
    let el = &t.scenes[0].elements[0];
    assert_eq!(el.id, "main_text");
    let ElementProps::Text(p) = &el.props else {
        panic!("expected text props");
    };
    assert_eq!(p.text.as_deref(), Some("Launch day"));
    assert_eq!(p.font_size, Some(32.0));
}

#[test]
fn slideshow_splits_duration_evenly() {
    let req = GenerationRequest {
        generation_type: GenerationType::Slideshow,
        duration: Some(12.0),
        images: vec!["a.png".into(), "b.png".into(), "c.png".into()],
        ..GenerationRequest::default()
    };
    let t = synthesize(&req);
    assert_eq!(t.scenes.len(), 3);
    for (i, s) in t.scenes.iter().enumerate() {
        assert_eq!(s.id, format!("slide_{i}"));
        assert!((s.duration - 4.0).abs() < 1e-9);
        assert_eq!(s.elements[0].kind(), ElementKind::Image);
    }
    assert!((t.duration - 12.0).abs() < 1e-9);
    assert!(t.check_structure().is_ok());
}

#[test]
fn other_types_get_a_placeholder() {
    let req = GenerationRequest {
        generation_type: GenerationType::AiAvatar,
        ..GenerationRequest::default()
    };
    let t = synthesize(&req);
    assert_eq!(t.scenes[0].id, "default_scene");
    assert_eq!(t.scenes[0].elements[0].id, "placeholder_text");
    assert_eq!(t.duration, 10.0);
    assert_eq!(t.aspect_ratio, AspectRatio::Landscape);
}

#[test]
fn request_accepts_snake_and_camel_case() {
    let a: GenerationRequest =
        serde_json::from_str(r#"{"generation_type":"slideshow","aspect_ratio":"1:1"}"#).unwrap();
    let b: GenerationRequest =
        serde_json::from_str(r#"{"generationType":"slideshow","aspectRatio":"1:1"}"#).unwrap();
    assert_eq!(a.generation_type, GenerationType::Slideshow);
    assert_eq!(b.generation_type, GenerationType::Slideshow);
    assert_eq!(a.aspect_ratio, Some(AspectRatio::Square));
    assert_eq!(b.aspect_ratio, Some(AspectRatio::Square));
}
