use crate::foundation::error::ClipforgeResult;
use crate::scene::model::{Position, Size, Template};
use crate::scene::props::ElementKind;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Value type of an editable field, for UI form generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Number,
    String,
    Color,
    Select,
}

/// Schema entry for one editable field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<&'static str>>,
    pub description: &'static str,
}

impl FieldSchema {
    fn number(min: f64, max: f64, description: &'static str) -> Self {
        Self {
            kind: FieldType::Number,
            min: Some(min),
            max: Some(max),
            options: None,
            description,
        }
    }

    fn plain(kind: FieldType, description: &'static str) -> Self {
        Self {
            kind,
            min: None,
            max: None,
            options: None,
            description,
        }
    }

    fn select(options: &[&'static str], description: &'static str) -> Self {
        Self {
            kind: FieldType::Select,
            min: None,
            max: None,
            options: Some(options.to_vec()),
            description,
        }
    }
}

/// Fields grouped by section (`position`, `size`, `properties`).
pub type CustomizationOptions = BTreeMap<&'static str, BTreeMap<&'static str, FieldSchema>>;

/// An element listed in `customizable_elements`, with its current values and edit schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomizableElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub scene_id: String,
    pub current_properties: Map<String, Value>,
    pub position: Position,
    pub size: Size,
    pub customization_options: CustomizationOptions,
}

/// List every element whose id is in `template.customizable_elements`, in scene order.
pub fn customizable_elements(template: &Template) -> ClipforgeResult<Vec<CustomizableElement>> {
    template
        .elements()
        .filter(|(_, el)| template.is_customizable(&el.id))
        .map(|(scene, el)| {
            Ok(CustomizableElement {
                id: el.id.clone(),
                kind: el.kind(),
                scene_id: scene.id.clone(),
                current_properties: el.props.to_map()?,
                position: el.position,
                size: el.size,
                customization_options: options_for(el.kind()),
            })
        })
        .collect()
}

/// Static edit schema for an element kind. Independent of any template data.
pub fn options_for(kind: ElementKind) -> CustomizationOptions {
    let mut out = CustomizationOptions::new();
    out.insert(
        "position",
        BTreeMap::from([
            ("x", FieldSchema::number(0.0, 100.0, "X position (%)")),
            ("y", FieldSchema::number(0.0, 100.0, "Y position (%)")),
        ]),
    );
    out.insert(
        "size",
        BTreeMap::from([
            ("width", FieldSchema::number(0.0, 100.0, "Width (%), above 0")),
            ("height", FieldSchema::number(0.0, 100.0, "Height (%), above 0")),
        ]),
    );

    let properties = match kind {
        ElementKind::Text => Some(text_fields()),
        ElementKind::Image => Some(image_fields()),
        ElementKind::Shape => Some(shape_fields()),
        _ => None,
    };
    if let Some(p) = properties {
        out.insert("properties", p);
    }
    out
}

fn text_fields() -> BTreeMap<&'static str, FieldSchema> {
    BTreeMap::from([
        ("text", FieldSchema::plain(FieldType::String, "Text content")),
        ("fontSize", FieldSchema::number(8.0, 200.0, "Font size")),
        (
            "fontFamily",
            FieldSchema::plain(FieldType::String, "Font family"),
        ),
        ("color", FieldSchema::plain(FieldType::Color, "Text color")),
        (
            "textAlign",
            FieldSchema::select(&["left", "center", "right"], "Text alignment"),
        ),
        (
            "fontWeight",
            FieldSchema::select(
                &[
                    "normal", "bold", "100", "200", "300", "400", "500", "600", "700", "800",
                    "900",
                ],
                "Font weight",
            ),
        ),
    ])
}

fn image_fields() -> BTreeMap<&'static str, FieldSchema> {
    BTreeMap::from([
        (
            "src",
            FieldSchema::plain(FieldType::String, "Image source URL"),
        ),
        ("opacity", FieldSchema::number(0.0, 1.0, "Image opacity")),
        (
            "filter",
            FieldSchema::plain(FieldType::String, "CSS filter effects"),
        ),
    ])
}

fn shape_fields() -> BTreeMap<&'static str, FieldSchema> {
    BTreeMap::from([
        (
            "shapeType",
            FieldSchema::select(&["rectangle", "circle", "triangle"], "Shape type"),
        ),
        ("fillColor", FieldSchema::plain(FieldType::Color, "Fill color")),
        (
            "strokeColor",
            FieldSchema::plain(FieldType::Color, "Stroke color"),
        ),
        ("strokeWidth", FieldSchema::number(0.0, 20.0, "Stroke width")),
    ])
}

#[cfg(test)]
#[path = "../../tests/unit/customize/options.rs"]
mod tests;
