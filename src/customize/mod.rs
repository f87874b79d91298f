//! Customization engine: validates override documents and merges them into a deep copy of a
//! template's scene graph.

pub mod merge;
pub mod options;
pub mod request;
pub mod validate;

pub use merge::{
    Customized, PREVIEW_MAX_DURATION, customize, customize_validated, preview,
    rescale_scene_durations,
};
pub use options::{CustomizableElement, customizable_elements, options_for};
pub use request::{CustomizationRequest, ElementOverride, SceneOverride};
pub use validate::{ValidationIssue, ValidationReport, validate};
