use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Element type tag as it appears in template JSON (`"type": "text"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Wrapped text block.
    Text,
    /// Raster image (rendered as a placeholder).
    Image,
    /// Video clip (not rasterized).
    Video,
    /// Audio track (not rasterized).
    Audio,
    /// Filled geometric shape.
    Shape,
    /// Visual effect (not rasterized).
    Effect,
}

impl ElementKind {
    /// Wire label (`"text"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Shape => "shape",
            Self::Effect => "effect",
        }
    }
}

/// Horizontal alignment of wrapped text lines inside the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Properties of a `text` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font size in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Preferred font family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Hex color (`#rrggbb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Line alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// CSS-like weight (`"bold"`, `"700"`, `700`); kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<Value>,
    /// Keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextProps {
    /// Text to draw, falling back to a sample string.
    pub fn text_or_default(&self) -> &str {
        self.text.as_deref().unwrap_or("Sample Text")
    }

    /// Font size, falling back to 24px.
    pub fn font_size_or_default(&self) -> f64 {
        self.font_size.unwrap_or(24.0)
    }
}

/// Properties of an `image` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Source URL or path. Empty or missing sources draw nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Opacity in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// CSS filter string; kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Geometry drawn by a `shape` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    /// Axis-aligned rectangle filling the element box.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the element box.
    Circle,
    /// Isosceles triangle with its apex at the top center of the box.
    Triangle,
}

/// Properties of a `shape` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    /// Geometry kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeType>,
    /// Fill hex color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Stroke hex color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Stroke width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed per-kind element properties.
///
/// Kinds without a typed schema keep their raw property map so documents survive a
/// load/save cycle untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementProps {
    /// `text` element.
    Text(TextProps),
    /// `image` element.
    Image(ImageProps),
    /// `shape` element.
    Shape(ShapeProps),
    /// `video`, `audio` or `effect` element.
    Other {
        /// The element kind.
        kind: ElementKind,
        /// Raw property map.
        properties: Map<String, Value>,
    },
}

impl ElementProps {
    /// Build typed properties for `kind` from a raw JSON map.
    pub fn from_parts(kind: ElementKind, properties: Map<String, Value>) -> ClipforgeResult<Self> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: ElementKind,
            properties: Map<String, Value>,
        ) -> ClipforgeResult<T> {
            serde_json::from_value(Value::Object(properties)).map_err(|e| {
                ClipforgeError::validation(format!("invalid {} properties: {e}", kind.as_str()))
            })
        }

        Ok(match kind {
            ElementKind::Text => Self::Text(parse(kind, properties)?),
            ElementKind::Image => Self::Image(parse(kind, properties)?),
            ElementKind::Shape => Self::Shape(parse(kind, properties)?),
            ElementKind::Video | ElementKind::Audio | ElementKind::Effect => {
                Self::Other { kind, properties }
            }
        })
    }

    /// Element kind these properties belong to.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Image(_) => ElementKind::Image,
            Self::Shape(_) => ElementKind::Shape,
            Self::Other { kind, .. } => *kind,
        }
    }

    /// Serialize back to a raw JSON map (camelCase keys, unknown keys preserved).
    pub fn to_map(&self) -> ClipforgeResult<Map<String, Value>> {
        let value = match self {
            Self::Text(p) => serde_json::to_value(p),
            Self::Image(p) => serde_json::to_value(p),
            Self::Shape(p) => serde_json::to_value(p),
            Self::Other { properties, .. } => return Ok(properties.clone()),
        }
        .map_err(|e| ClipforgeError::serde(format!("serialize element properties: {e}")))?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ClipforgeError::serde(
                "element properties did not serialize to an object",
            )),
        }
    }

    /// Shallow merge: keys in `overrides` replace existing keys, others persist.
    ///
    /// The merged map is re-parsed for the same kind, so a type mismatch in an override value
    /// is reported instead of silently dropped.
    pub fn merged(&self, overrides: &Map<String, Value>) -> ClipforgeResult<Self> {
        let mut map = self.to_map()?;
        for (k, v) in overrides {
            map.insert(k.clone(), v.clone());
        }
        Self::from_parts(self.kind(), map)
    }
}
