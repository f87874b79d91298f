use crate::customize::request::{CustomizationRequest, ElementOverride, SceneOverride};
use crate::customize::validate::{ValidationReport, validate};
use crate::foundation::core::AspectRatio;
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::scene::model::{Element, SceneType, Template, VideoStyle};

/// Upper bound on preview length, in seconds.
pub const PREVIEW_MAX_DURATION: f64 = 10.0;

/// A derived graph together with the non-fatal findings produced while validating it.
#[derive(Debug, Clone)]
pub struct Customized {
    pub template: Template,
    pub report: ValidationReport,
}

/// Apply `req` to a deep copy of `template`.
///
/// The input is never mutated. This does not validate; see [`customize_validated`] for the
/// atomic variant.
#[tracing::instrument(skip_all, fields(elements = req.elements.len(), scenes = req.scenes.len()))]
pub fn customize(template: &Template, req: &CustomizationRequest) -> ClipforgeResult<Template> {
    let mut out = template.clone();

    if req.duration.is_some() {
        let d = req
            .duration_secs()
            .ok_or_else(|| ClipforgeError::validation("duration must be a positive number"))?;
        out.duration = d;
        rescale_scene_durations(&mut out, d);
    }
    if let Some(ratio) = req.aspect_ratio.as_deref() {
        out.aspect_ratio = ratio.parse::<AspectRatio>()?;
    }
    if let Some(style) = req.default_style.as_deref() {
        out.default_style = VideoStyle::parse(style).ok_or_else(|| {
            ClipforgeError::validation(format!("invalid default style '{style}'"))
        })?;
    }

    for (id, ov) in &req.scenes {
        apply_scene_override(&mut out, id, ov)?;
    }
    for (id, ov) in &req.elements {
        apply_element_override(&mut out, id, ov)?;
    }

    Ok(out)
}

/// Validate, then apply only if the request is valid.
pub fn customize_validated(
    template: &Template,
    req: &CustomizationRequest,
) -> ClipforgeResult<Customized> {
    let report = validate(template, req);
    if !report.is_valid {
        tracing::info!(errors = report.errors.len(), "customization rejected");
        return Err(ClipforgeError::Rejected(report));
    }
    let template = customize(template, req)?;
    Ok(Customized { template, report })
}

/// Cheap-to-render variant of [`customize`].
///
/// Total length is capped at [`PREVIEW_MAX_DURATION`] and every element keeps at most its
/// first animation.
pub fn preview(template: &Template, req: &CustomizationRequest) -> ClipforgeResult<Template> {
    let mut out = customize(template, req)?;

    if out.total_scene_duration() > PREVIEW_MAX_DURATION {
        rescale_scene_durations(&mut out, PREVIEW_MAX_DURATION);
    }
    out.duration = out.duration.min(PREVIEW_MAX_DURATION);

    for scene in &mut out.scenes {
        for el in &mut scene.elements {
            el.animations.truncate(1);
        }
    }
    Ok(out)
}

/// Scale every scene so durations sum to `new_total`, preserving each scene's share.
///
/// A graph whose current total is not positive is left untouched.
pub fn rescale_scene_durations(template: &mut Template, new_total: f64) {
    let current = template.total_scene_duration();
    if current <= 0.0 {
        return;
    }
    let factor = new_total / current;
    for scene in &mut template.scenes {
        scene.duration *= factor;
    }
}

fn apply_scene_override(
    template: &mut Template,
    id: &str,
    ov: &SceneOverride,
) -> ClipforgeResult<()> {
    let Some(scene) = template.scenes.iter_mut().find(|s| s.id == id) else {
        tracing::debug!(scene = id, "scene override targets unknown scene");
        return Ok(());
    };
    if ov.duration.is_some() {
        scene.duration = ov.duration_secs().ok_or_else(|| {
            ClipforgeError::validation(format!("scene '{id}': duration must be a positive number"))
        })?;
    }
    if let Some(kind) = ov.kind.as_deref() {
        scene.kind = SceneType::parse(kind).ok_or_else(|| {
            ClipforgeError::validation(format!("scene '{id}': invalid scene type '{kind}'"))
        })?;
    }
    if let Some(transitions) = &ov.transitions {
        scene.transitions = transitions.clone();
    }
    Ok(())
}

fn apply_element_override(
    template: &mut Template,
    id: &str,
    ov: &ElementOverride,
) -> ClipforgeResult<()> {
    // Ids are treated as global: every element carrying this id receives the override.
    let targets = template
        .scenes
        .iter_mut()
        .flat_map(|s| s.elements.iter_mut())
        .filter(|e| e.id == id);
    for el in targets {
        apply_to_element(el, ov)?;
    }
    Ok(())
}

fn apply_to_element(el: &mut Element, ov: &ElementOverride) -> ClipforgeResult<()> {
    if let Some(props) = &ov.properties {
        el.props = el
            .props
            .merged(props)
            .map_err(|e| ClipforgeError::validation(format!("element '{}': {e}", el.id)))?;
    }
    if let Some(pos) = ov.position {
        el.position = pos;
    }
    if let Some(size) = ov.size {
        el.size = size;
    }
    if let Some(anims) = &ov.animations {
        el.animations = anims.clone();
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/customize/merge.rs"]
mod tests;
