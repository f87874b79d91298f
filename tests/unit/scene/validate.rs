use super::*;
use serde_json::json;

fn template(scenes: serde_json::Value) -> Template {
    let total: f64 = scenes
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["duration"].as_f64().unwrap())
        .sum();
    Template::from_value(json!({
        "duration": total,
        "aspect_ratio": "16:9",
        "default_style": "minimalist",
        "scenes": scenes,
    }))
    .unwrap()
}

fn headline(text: &str, font_size: f64) -> serde_json::Value {
    json!({
        "id": "title", "type": "text",
        "position": {"x": 10, "y": 10}, "size": {"width": 80, "height": 20},
        "properties": {"text": text, "fontSize": font_size},
    })
}

fn paths(report: &ValidationReport) -> Vec<&str> {
    report.errors.iter().map(|e| e.path.as_str()).collect()
}

#[test]
fn well_formed_graph_passes() {
    let t = template(json!([
        {"id": "intro", "type": "intro", "duration": 2.0, "elements": [headline("Hi", 40.0)]},
        {"id": "body", "type": "main", "duration": 3.0, "elements": [{
            "id": "logo", "type": "image",
            "position": {"x": 0, "y": 0}, "size": {"width": 100, "height": 100},
            "properties": {"src": "logo.png"},
        }]},
    ]));
    let report = t.validate();
    assert!(report.is_valid, "{report}");
    assert!(report.warnings.is_empty());
}

#[test]
fn no_scenes_is_an_error() {
    let t = template(json!([]));
    let report = t.validate();
    assert!(!report.is_valid);
    assert_eq!(paths(&report), ["scenes", "duration"]);
}

#[test]
fn total_duration_bounds() {
    let short = template(json!([
        {"id": "s", "type": "main", "duration": 0.5, "elements": [headline("Hi", 40.0)]},
    ]));
    assert!(
        short
            .validate()
            .error_messages()
            .any(|m| m == "Duration too short: 0.5s (minimum: 1.0s)")
    );

    let long = template(json!([
        {"id": "s", "type": "main", "duration": 601.0, "elements": [headline("Hi", 40.0)]},
    ]));
    assert!(long.validate().error_messages().any(|m| m.starts_with("Duration too long")));
}

#[test]
fn empty_scene_and_bad_scene_duration() {
    let t = template(json!([
        {"id": "a", "type": "main", "duration": 2.0, "elements": []},
        {"id": "b", "type": "main", "duration": 0.0, "elements": [headline("Hi", 40.0)]},
    ]));
    let report = t.validate();
    assert_eq!(paths(&report), ["scenes.a.elements", "scenes.b.duration"]);
    assert!(report.error_messages().any(|m| m == "Scene a: No elements provided"));
    assert!(report.error_messages().any(|m| m == "Scene b: Invalid duration"));
}

#[test]
fn element_geometry_is_checked() {
    let t = template(json!([{"id": "s", "type": "main", "duration": 2.0, "elements": [
        {
            "id": "off", "type": "shape",
            "position": {"x": 120, "y": 0}, "size": {"width": 10, "height": 10},
        },
        {
            "id": "flat", "type": "shape",
            "position": {"x": 0, "y": 0}, "size": {"width": 0, "height": 10},
        },
    ]}]));
    assert_eq!(
        paths(&t.validate()),
        ["scenes.s.elements.off.position", "scenes.s.elements.flat.size"]
    );
}

#[test]
fn text_and_image_requirements() {
    let t = template(json!([{"id": "s", "type": "main", "duration": 2.0, "elements": [
        headline("  ", 4.0),
        {
            "id": "pic", "type": "image",
            "position": {"x": 0, "y": 0}, "size": {"width": 10, "height": 10},
            "properties": {"src": ""},
        },
    ]}]));
    assert_eq!(
        paths(&t.validate()),
        [
            "scenes.s.elements.title.properties.text",
            "scenes.s.elements.title.properties.fontSize",
            "scenes.s.elements.pic.properties.src",
        ]
    );
}

#[test]
fn missing_font_size_uses_the_default() {
    let t = template(json!([{"id": "s", "type": "main", "duration": 2.0, "elements": [{
        "id": "t", "type": "text",
        "position": {"x": 0, "y": 0}, "size": {"width": 10, "height": 10},
        "properties": {"text": "ok"},
    }]}]));
    assert!(t.validate().is_valid);
}

#[test]
fn declared_duration_drift_is_a_warning() {
    let mut t = template(json!([
        {"id": "s", "type": "main", "duration": 4.0, "elements": [headline("Hi", 40.0)]},
    ]));
    t.duration = 4.05;
    assert!(t.validate().warnings.is_empty());

    t.duration = 5.0;
    let report = t.validate();
    assert!(report.is_valid);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].path, "duration");
}
