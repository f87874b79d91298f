use super::*;
use crate::customize::validate::ValidationIssue;

#[test]
fn constructors_pick_the_matching_variant() {
    assert!(matches!(ClipforgeError::validation("x"), ClipforgeError::Validation(_)));
    assert!(matches!(ClipforgeError::composition("x"), ClipforgeError::Composition(_)));
    assert!(matches!(ClipforgeError::encoding("x"), ClipforgeError::Encoding(_)));
    assert!(matches!(ClipforgeError::thumbnail("x"), ClipforgeError::Thumbnail(_)));
    assert!(matches!(ClipforgeError::io("x"), ClipforgeError::Io(_)));
    assert!(matches!(ClipforgeError::serde("x"), ClipforgeError::Serde(_)));
}

#[test]
fn display_prefixes_the_category() {
    assert_eq!(
        ClipforgeError::encoding("ffmpeg exited").to_string(),
        "encoding error: ffmpeg exited"
    );
    assert_eq!(ClipforgeError::io("disk full").to_string(), "io error: disk full");
}

#[test]
fn rejected_exposes_its_report() {
    let report = ValidationReport::new(
        vec![ValidationIssue::at("elements.x", "Element 'x' not found in template")],
        Vec::new(),
    );
    let err = ClipforgeError::Rejected(report.clone());
    assert_eq!(err.report(), Some(&report));
    assert!(err.to_string().contains("not found"));
    assert!(ClipforgeError::io("x").report().is_none());
}

#[test]
fn anyhow_errors_convert_transparently() {
    let err: ClipforgeError = anyhow::anyhow!("lower level").into();
    assert_eq!(err.to_string(), "lower level");
}
