//! Boundary scene graph model: templates, scenes, elements and their typed properties.

pub mod model;
pub mod props;
pub mod synthesize;
pub mod validate;
