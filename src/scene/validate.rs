use crate::customize::validate::{ValidationIssue, ValidationReport};
use crate::scene::model::{Element, Template};
use crate::scene::props::ElementProps;

/// Shortest renderable output, in seconds.
pub const MIN_TOTAL_DURATION: f64 = 1.0;
/// Longest renderable output, in seconds.
pub const MAX_TOTAL_DURATION: f64 = 600.0;

const DURATION_MISMATCH_TOLERANCE: f64 = 0.1;
const MIN_FONT_SIZE: f64 = 8.0;
const MAX_FONT_SIZE: f64 = 200.0;

impl Template {
    /// Check a scene graph before it is rendered.
    ///
    /// Errors are keyed by path (`scenes.intro.elements.title.size`). A mismatch between the
    /// summed scene durations and [`Template::duration`] is only a warning.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.scenes.is_empty() {
            errors.push(ValidationIssue::at("scenes", "No scenes provided"));
        }

        let total = self.total_scene_duration();
        if !total.is_finite() || total < MIN_TOTAL_DURATION {
            errors.push(ValidationIssue::at(
                "duration",
                format!("Duration too short: {total}s (minimum: {MIN_TOTAL_DURATION:.1}s)"),
            ));
        } else if total > MAX_TOTAL_DURATION {
            errors.push(ValidationIssue::at(
                "duration",
                format!("Duration too long: {total}s (maximum: {MAX_TOTAL_DURATION:.1}s)"),
            ));
        } else if (total - self.duration).abs() > DURATION_MISMATCH_TOLERANCE {
            warnings.push(ValidationIssue::at(
                "duration",
                format!(
                    "Scene durations sum to {total}s but template duration is {}s",
                    self.duration
                ),
            ));
        }

        for scene in &self.scenes {
            let path = format!("scenes.{}", scene.id);
            if !(scene.duration.is_finite() && scene.duration > 0.0) {
                errors.push(ValidationIssue::at(
                    format!("{path}.duration"),
                    format!("Scene {}: Invalid duration", scene.id),
                ));
            }
            if scene.elements.is_empty() {
                errors.push(ValidationIssue::at(
                    format!("{path}.elements"),
                    format!("Scene {}: No elements provided", scene.id),
                ));
            }
            for el in &scene.elements {
                check_element(&format!("{path}.elements.{}", el.id), el, &mut errors);
            }
        }

        ValidationReport::new(errors, warnings)
    }
}

fn check_element(path: &str, el: &Element, errors: &mut Vec<ValidationIssue>) {
    let pos = el.position;
    if !(in_range(pos.x, 0.0, 100.0) && in_range(pos.y, 0.0, 100.0)) {
        errors.push(ValidationIssue::at(
            format!("{path}.position"),
            format!("Element {}: Position must be between 0 and 100", el.id),
        ));
    }
    let size = el.size;
    if ![size.width, size.height]
        .iter()
        .all(|&v| v.is_finite() && v > 0.0 && v <= 100.0)
    {
        errors.push(ValidationIssue::at(
            format!("{path}.size"),
            format!("Element {}: Size must be greater than 0 and at most 100", el.id),
        ));
    }

    match &el.props {
        ElementProps::Text(p) => {
            if p.text.as_deref().is_none_or(|t| t.trim().is_empty()) {
                errors.push(ValidationIssue::at(
                    format!("{path}.properties.text"),
                    format!("Text element {}: No text provided", el.id),
                ));
            }
            if !in_range(p.font_size.unwrap_or(16.0), MIN_FONT_SIZE, MAX_FONT_SIZE) {
                errors.push(ValidationIssue::at(
                    format!("{path}.properties.fontSize"),
                    format!("Text element {}: Invalid font size", el.id),
                ));
            }
        }
        ElementProps::Image(p) => {
            if p.src.as_deref().is_none_or(str::is_empty) {
                errors.push(ValidationIssue::at(
                    format!("{path}.properties.src"),
                    format!("Image element {}: No source provided", el.id),
                ));
            }
        }
        _ => {}
    }
}

fn in_range(v: f64, lo: f64, hi: f64) -> bool {
    v.is_finite() && v >= lo && v <= hi
}

#[cfg(test)]
#[path = "../../tests/unit/scene/validate.rs"]
mod tests;
