use crate::foundation::core::AspectRatio;
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::scene::props::{ElementKind, ElementProps};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Visual style label carried by a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStyle {
    #[default]
    Cinematic,
    Animated,
    Realistic,
    Cartoon,
    Minimalist,
}

impl VideoStyle {
    pub const ALL: [VideoStyle; 5] = [
        VideoStyle::Cinematic,
        VideoStyle::Animated,
        VideoStyle::Realistic,
        VideoStyle::Cartoon,
        VideoStyle::Minimalist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cinematic => "cinematic",
            Self::Animated => "animated",
            Self::Realistic => "realistic",
            Self::Cartoon => "cartoon",
            Self::Minimalist => "minimalist",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    Intro,
    Main,
    Outro,
    Transition,
}

impl SceneType {
    pub const ALL: [SceneType; 4] = [
        SceneType::Intro,
        SceneType::Main,
        SceneType::Outro,
        SceneType::Transition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Main => "main",
            Self::Outro => "outro",
            Self::Transition => "transition",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationType {
    FadeIn,
    FadeOut,
    SlideIn,
    SlideOut,
    ZoomIn,
    ZoomOut,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    Cut,
    Fade,
    Dissolve,
    Wipe,
    Slide,
}

/// Element position as a percentage of the canvas (top-left anchored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Layering hint. Paint order is array order; `z` is carried but not used for compositing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

/// Element size as a percentage of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    #[serde(rename = "type")]
    pub kind: AnimationType,
    pub duration: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default = "default_easing")]
    pub easing: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

fn default_easing() -> String {
    "ease-in-out".to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: TransitionType,
    pub duration: f64,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A single positioned, typed visual primitive.
///
/// On the wire the kind lives in `type` and the kind-specific fields in `properties`; in memory
/// both are folded into [`ElementProps`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementDef", into = "ElementDef")]
pub struct Element {
    pub id: String,
    pub position: Position,
    pub size: Size,
    pub props: ElementProps,
    pub animations: Vec<Animation>,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        self.props.kind()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ElementDef {
    id: String,
    #[serde(rename = "type")]
    kind: ElementKind,
    position: Position,
    size: Size,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    animations: Vec<Animation>,
}

impl TryFrom<ElementDef> for Element {
    type Error = ClipforgeError;

    fn try_from(def: ElementDef) -> ClipforgeResult<Self> {
        let props = ElementProps::from_parts(def.kind, def.properties)
            .map_err(|e| ClipforgeError::validation(format!("element '{}': {e}", def.id)))?;
        Ok(Self {
            id: def.id,
            position: def.position,
            size: def.size,
            props,
            animations: def.animations,
        })
    }
}

impl From<Element> for ElementDef {
    fn from(el: Element) -> Self {
        let kind = el.kind();
        // Typed props always serialize to an object; an empty map is the only fallback.
        let properties = el.props.to_map().unwrap_or_default();
        Self {
            id: el.id,
            kind,
            position: el.position,
            size: el.size,
            properties,
            animations: el.animations,
        }
    }
}

/// A time-boxed segment of the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SceneType,
    pub duration: f64,
    pub elements: Vec<Element>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Reusable declarative scene graph.
///
/// Templates are read-only inputs: customization always works on a clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub duration: f64,
    pub aspect_ratio: AspectRatio,
    pub default_style: VideoStyle,
    #[serde(default)]
    pub customizable_elements: Vec<String>,
    pub scenes: Vec<Scene>,
}

impl Template {
    /// Parse a template scene graph from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ClipforgeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ClipforgeError::serde(format!("parse template JSON: {e}")))
    }

    /// Parse a template scene graph from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ClipforgeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ClipforgeError::io(format!("open template JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a template scene graph from an already-decoded JSON value.
    pub fn from_value(value: Value) -> ClipforgeResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ClipforgeError::serde(format!("parse template JSON: {e}")))
    }

    pub fn to_value(&self) -> ClipforgeResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| ClipforgeError::serde(format!("serialize template: {e}")))
    }

    /// Sum of scene durations. This, not [`Template::duration`], is what gets rendered.
    pub fn total_scene_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration).sum()
    }

    /// All elements in scene order, paired with their owning scene.
    pub fn elements(&self) -> impl Iterator<Item = (&Scene, &Element)> {
        self.scenes
            .iter()
            .flat_map(|s| s.elements.iter().map(move |e| (s, e)))
    }

    /// First element with `id`, searching every scene in order.
    pub fn find_element(&self, id: &str) -> Option<&Element> {
        self.elements().map(|(_, e)| e).find(|e| e.id == id)
    }

    pub fn find_scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn is_customizable(&self, element_id: &str) -> bool {
        self.customizable_elements.iter().any(|id| id == element_id)
    }

    /// Check the invariants the compositor relies on.
    ///
    /// Customization never produces these states from a valid template, so a failure here means
    /// the graph was malformed before it reached the renderer.
    pub fn check_structure(&self) -> ClipforgeResult<()> {
        if self.scenes.is_empty() {
            return Err(ClipforgeError::composition("template has no scenes"));
        }
        for scene in &self.scenes {
            if !scene.duration.is_finite() || scene.duration < 0.0 {
                return Err(ClipforgeError::composition(format!(
                    "scene '{}' has invalid duration {}",
                    scene.id, scene.duration
                )));
            }
            for el in &scene.elements {
                let geometry = [el.position.x, el.position.y, el.size.width, el.size.height];
                if geometry.iter().any(|v| !v.is_finite()) {
                    return Err(ClipforgeError::composition(format!(
                        "scene '{}', element '{}': position/size must be finite",
                        scene.id, el.id
                    )));
                }
                if el.size.width < 0.0 || el.size.height < 0.0 {
                    return Err(ClipforgeError::composition(format!(
                        "scene '{}', element '{}': size must be non-negative",
                        scene.id, el.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
