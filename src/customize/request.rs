use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::scene::model::{Animation, Position, Size, Transition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-user override document applied on top of a template.
///
/// `duration`, `aspect_ratio` and `default_style` stay raw here so that bad values are
/// reported by validation as itemized errors instead of failing the JSON parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomizationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_style: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub elements: BTreeMap<String, ElementOverride>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scenes: BTreeMap<String, SceneOverride>,
}

impl CustomizationRequest {
    pub fn from_reader<R: std::io::Read>(r: R) -> ClipforgeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ClipforgeError::serde(format!("parse customization JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ClipforgeResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).map_err(|e| {
            ClipforgeError::io(format!("open customization JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    pub fn from_value(value: Value) -> ClipforgeResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ClipforgeError::serde(format!("parse customization JSON: {e}")))
    }

    /// The requested total duration, if present and usable.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration.as_ref().and_then(positive_seconds)
    }

    /// `true` when applying this request changes nothing.
    pub fn is_empty(&self) -> bool {
        self.duration.is_none()
            && self.aspect_ratio.is_none()
            && self.default_style.is_none()
            && self.elements.is_empty()
            && self.scenes.is_empty()
    }
}

/// Partial override of a single element.
///
/// `properties` is shallow-merged; `position`, `size` and `animations` replace wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<Vec<Animation>>,
}

/// Direct override of a scene. Not subject to global duration rescaling.
///
/// `duration` and `type` are raw for the same reason as on [`CustomizationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitions: Option<Vec<Transition>>,
}

impl SceneOverride {
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration.as_ref().and_then(positive_seconds)
    }
}

/// A JSON number that is finite and strictly positive.
pub(crate) fn positive_seconds(v: &Value) -> Option<f64> {
    v.as_f64().filter(|d| d.is_finite() && *d > 0.0)
}
