use crate::customize::validate::{ValidationIssue, ValidationReport};
use crate::foundation::core::{AspectRatio, Resolution};
use crate::scene::model::Template;
use serde::{Deserialize, Serialize};

/// Frame rates outside this band render, but are flagged.
const RECOMMENDED_FPS: std::ops::RangeInclusive<u32> = 15..=60;
const KNOWN_QUALITIES: [&str; 4] = ["low", "medium", "high", "ultra"];

/// Per-render output settings.
///
/// `quality` is an opaque label: it is reported back in metadata and never interpreted by
/// the compositor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_quality")]
    pub quality: String,
}

fn default_fps() -> u32 {
    30
}

fn default_quality() -> String {
    "medium".to_owned()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            fps: default_fps(),
            quality: default_quality(),
        }
    }
}

impl RenderConfig {
    /// Default settings using the template's aspect ratio.
    pub fn for_template(template: &Template) -> Self {
        Self {
            aspect_ratio: template.aspect_ratio,
            ..Self::default()
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.aspect_ratio.resolution()
    }

    /// Sanity-check the settings before a render.
    pub fn check(&self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.fps == 0 {
            errors.push(ValidationIssue::at("fps", "FPS must be greater than 0"));
        } else if !RECOMMENDED_FPS.contains(&self.fps) {
            warnings.push(ValidationIssue::at(
                "fps",
                format!(
                    "FPS {} is outside the recommended range {}-{}",
                    self.fps,
                    RECOMMENDED_FPS.start(),
                    RECOMMENDED_FPS.end()
                ),
            ));
        }

        if !KNOWN_QUALITIES.contains(&self.quality.as_str()) {
            warnings.push(ValidationIssue::at(
                "quality",
                format!("Unknown quality label '{}'", self.quality),
            ));
        }

        ValidationReport::new(errors, warnings)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
