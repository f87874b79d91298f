use crate::customize::request::{
    CustomizationRequest, ElementOverride, SceneOverride, positive_seconds,
};
use crate::foundation::core::{AspectRatio, accepted_ratios};
use crate::scene::model::{Animation, Element, SceneType, Template, VideoStyle};
use crate::scene::props::ElementKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const DURATION_MISMATCH_TOLERANCE: f64 = 0.1;

/// One finding, keyed to the offending field or id (`elements.title.properties.fontSize`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub(crate) fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Itemized validation outcome. Warnings never make a report invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Error messages without their paths.
    pub fn error_messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.message.as_str())
    }

    pub fn warning_messages(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Validate `req` against `template` without applying anything.
pub fn validate(template: &Template, req: &CustomizationRequest) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Some(d) = &req.duration
        && positive_seconds(d).is_none()
    {
        errors.push(ValidationIssue::at(
            "duration",
            "Duration must be a positive number",
        ));
    }

    if let Some(ratio) = req.aspect_ratio.as_deref()
        && ratio.parse::<AspectRatio>().is_err()
    {
        errors.push(ValidationIssue::at(
            "aspect_ratio",
            format!(
                "Invalid aspect ratio '{ratio}'. Must be one of: {}",
                accepted_ratios()
            ),
        ));
    }

    if let Some(style) = req.default_style.as_deref()
        && VideoStyle::parse(style).is_none()
    {
        let accepted = VideoStyle::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        errors.push(ValidationIssue::at(
            "default_style",
            format!("Invalid default style '{style}'. Must be one of: {accepted}"),
        ));
    }

    for (id, ov) in &req.elements {
        let path = format!("elements.{id}");
        if !template.is_customizable(id) {
            warnings.push(ValidationIssue::at(
                path.clone(),
                format!("Element '{id}' is not marked as customizable"),
            ));
        }
        let Some(element) = template.find_element(id) else {
            errors.push(ValidationIssue::at(
                path,
                format!("Element '{id}' not found in template"),
            ));
            continue;
        };
        validate_element_override(&path, element, ov, &mut errors);
    }

    for (id, ov) in &req.scenes {
        let path = format!("scenes.{id}");
        if template.find_scene(id).is_none() {
            warnings.push(ValidationIssue::at(
                path.clone(),
                format!("Scene '{id}' not found in template"),
            ));
        }
        validate_scene_override(&path, ov, &mut errors);
    }

    if req.duration.is_none() {
        let total = template.total_scene_duration();
        if (total - template.duration).abs() > DURATION_MISMATCH_TOLERANCE {
            warnings.push(ValidationIssue::at(
                "duration",
                format!(
                    "Scene durations sum to {total}s but template duration is {}s",
                    template.duration
                ),
            ));
        }
    }

    ValidationReport::new(errors, warnings)
}

fn validate_element_override(
    path: &str,
    element: &Element,
    ov: &ElementOverride,
    errors: &mut Vec<ValidationIssue>,
) {
    if let Some(props) = &ov.properties {
        validate_properties(path, element.kind(), props, errors);
        // Anything the typed schema cannot absorb would fail at merge time.
        if let Err(e) = element.props.merged(props) {
            errors.push(ValidationIssue::at(
                format!("{path}.properties"),
                e.to_string(),
            ));
        }
    }

    if let Some(pos) = &ov.position {
        for (axis, v) in [("x", pos.x), ("y", pos.y)] {
            if !in_range(v, 0.0, 100.0) {
                errors.push(ValidationIssue::at(
                    format!("{path}.position.{axis}"),
                    format!("Position {axis} must be between 0 and 100"),
                ));
            }
        }
    }

    if let Some(size) = &ov.size {
        for (dim, v) in [("width", size.width), ("height", size.height)] {
            if !(v.is_finite() && v > 0.0 && v <= 100.0) {
                errors.push(ValidationIssue::at(
                    format!("{path}.size.{dim}"),
                    format!("Size {dim} must be greater than 0 and at most 100"),
                ));
            }
        }
    }

    if let Some(anims) = &ov.animations {
        validate_animations(&format!("{path}.animations"), anims, errors);
    }
}

fn validate_properties(
    path: &str,
    kind: ElementKind,
    props: &Map<String, Value>,
    errors: &mut Vec<ValidationIssue>,
) {
    match kind {
        ElementKind::Text => {
            if let Some(v) = props.get("fontSize")
                && !number_in_range(v, 8.0, 200.0)
            {
                errors.push(ValidationIssue::at(
                    format!("{path}.properties.fontSize"),
                    "Font size must be between 8 and 200",
                ));
            }
        }
        ElementKind::Image => {
            if let Some(v) = props.get("opacity")
                && !number_in_range(v, 0.0, 1.0)
            {
                errors.push(ValidationIssue::at(
                    format!("{path}.properties.opacity"),
                    "Opacity must be between 0 and 1",
                ));
            }
        }
        _ => {}
    }
}

fn validate_animations(path: &str, anims: &[Animation], errors: &mut Vec<ValidationIssue>) {
    for (i, a) in anims.iter().enumerate() {
        if !(a.duration.is_finite() && a.duration > 0.0) {
            errors.push(ValidationIssue::at(
                format!("{path}[{i}].duration"),
                "Animation duration must be a positive number",
            ));
        }
        if !(a.delay.is_finite() && a.delay >= 0.0) {
            errors.push(ValidationIssue::at(
                format!("{path}[{i}].delay"),
                "Animation delay must not be negative",
            ));
        }
    }
}

fn validate_scene_override(path: &str, ov: &SceneOverride, errors: &mut Vec<ValidationIssue>) {
    if let Some(d) = &ov.duration
        && positive_seconds(d).is_none()
    {
        errors.push(ValidationIssue::at(
            format!("{path}.duration"),
            "Scene duration must be a positive number",
        ));
    }
    if let Some(kind) = ov.kind.as_deref()
        && SceneType::parse(kind).is_none()
    {
        let accepted = SceneType::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        errors.push(ValidationIssue::at(
            format!("{path}.type"),
            format!("Invalid scene type '{kind}'. Must be one of: {accepted}"),
        ));
    }
    if let Some(transitions) = &ov.transitions {
        for (i, t) in transitions.iter().enumerate() {
            if !(t.duration.is_finite() && t.duration > 0.0) {
                errors.push(ValidationIssue::at(
                    format!("{path}.transitions[{i}].duration"),
                    "Transition duration must be a positive number",
                ));
            }
        }
    }
}

fn in_range(v: f64, lo: f64, hi: f64) -> bool {
    v.is_finite() && v >= lo && v <= hi
}

fn number_in_range(v: &Value, lo: f64, hi: f64) -> bool {
    v.as_f64().is_some_and(|n| in_range(n, lo, hi))
}

#[cfg(test)]
#[path = "../../tests/unit/customize/validate.rs"]
mod tests;
