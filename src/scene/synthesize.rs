//! Scene graphs for requests that do not start from a stored template.

use crate::foundation::core::AspectRatio;
use crate::scene::model::{Element, Position, Scene, SceneType, Size, Template, VideoStyle};
use crate::scene::props::{ElementProps, ImageProps, TextAlign, TextProps};
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// How a non-template request should be turned into scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    #[default]
    TextToVideo,
    TemplateBased,
    Slideshow,
    SocialMedia,
    AiAvatar,
}

/// Loose generation request, as submitted by API callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default, alias = "generation_type")]
    pub generation_type: GenerationType,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, alias = "aspect_ratio")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default)]
    pub text_prompt: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Build a one-off template for `req`.
///
/// - `text_to_video`: one centered text scene showing the prompt.
/// - `slideshow`: one scene per image, the total duration split evenly.
/// - anything else: one placeholder text scene.
pub fn synthesize(req: &GenerationRequest) -> Template {
    let scenes = match req.generation_type {
        GenerationType::TextToVideo => vec![text_scene(
            "text_scene",
            "main_text",
            req.text_prompt.as_deref().unwrap_or("Generated Video"),
            32.0,
            Size {
                width: 80.0,
                height: 20.0,
            },
            req.duration.unwrap_or(10.0),
        )],
        GenerationType::Slideshow => slideshow_scenes(&req.images, req.duration.unwrap_or(20.0)),
        _ => vec![text_scene(
            "default_scene",
            "placeholder_text",
            "Video Content",
            28.0,
            Size {
                width: 60.0,
                height: 15.0,
            },
            req.duration.unwrap_or(10.0),
        )],
    };

    let duration = scenes.iter().map(|s| s.duration).sum();
    Template {
        id: None,
        duration,
        aspect_ratio: req.aspect_ratio.unwrap_or_default(),
        default_style: VideoStyle::default(),
        customizable_elements: Vec::new(),
        scenes,
    }
}

fn centered() -> Position {
    Position {
        x: 50.0,
        y: 50.0,
        z: None,
    }
}

fn text_scene(
    scene_id: &str,
    element_id: &str,
    text: &str,
    font_size: f64,
    size: Size,
    duration: f64,
) -> Scene {
    let props = TextProps {
        text: Some(text.to_owned()),
        font_size: Some(font_size),
        font_family: Some("Arial".to_owned()),
        color: Some("#ffffff".to_owned()),
        text_align: Some(TextAlign::Center),
        ..TextProps::default()
    };
    Scene {
        id: scene_id.to_owned(),
        kind: SceneType::Main,
        duration,
        elements: vec![Element {
            id: element_id.to_owned(),
            position: centered(),
            size,
            props: ElementProps::Text(props),
            animations: Vec::new(),
        }],
        transitions: Vec::new(),
    }
}

fn slideshow_scenes(images: &[String], total: f64) -> Vec<Scene> {
    let per_slide = total / images.len().max(1) as f64;
    images
        .iter()
        .enumerate()
        .map(|(i, src)| Scene {
            id: format!("slide_{i}"),
            kind: SceneType::Main,
            duration: per_slide,
            elements: vec![Element {
                id: format!("image_{i}"),
                position: centered(),
                size: Size {
                    width: 80.0,
                    height: 80.0,
                },
                props: ElementProps::Image(ImageProps {
                    src: Some(src.clone()),
                    extra: Map::new(),
                    ..ImageProps::default()
                }),
                animations: Vec::new(),
            }],
            transitions: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/synthesize.rs"]
mod tests;
