use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::scene::props::TextAlign;
use std::collections::HashMap;
use std::path::Path;

/// Last resort in every font stack; resolved against installed system fonts.
const GENERIC_FALLBACK: &str = "sans-serif";

/// DejaVu Sans, shipped so text renders on hosts without system fonts.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Stateful helper for building Parley text layouts against system fonts, an optional
/// registered default font and the bundled font.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    default_family: Option<String>,
    bundled_family: String,
    cpu_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl TextLayoutEngine {
    /// Construct a new engine, registering `default_font` (a TTF/OTF file) when given.
    pub(crate) fn new(default_font: Option<&Path>) -> ClipforgeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let bundled_family =
            register_font_bytes(&mut font_ctx, BUNDLED_FONT.to_vec(), "bundled font")?;
        let default_family = match default_font {
            Some(path) => Some(register_font_file(&mut font_ctx, path)?),
            None => None,
        };
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            default_family,
            bundled_family,
            cpu_fonts: HashMap::new(),
        })
    }

    /// Shape and lay out `text`, wrapping at `max_width_px` when given.
    ///
    /// `family` is tried first, then the registered default font, then the bundled font, then
    /// `sans-serif`.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        family: Option<&str>,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> ClipforgeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ClipforgeError::composition(
                "font size must be finite and > 0",
            ));
        }

        let stack = self.font_stack(family);
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        if let Some(w) = max_width_px {
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        }
        Ok(layout)
    }

    /// Rasterizer-side handle for a font referenced by a shaped run, cached by blob identity.
    pub(crate) fn cpu_font(
        &mut self,
        blob_id: u64,
        bytes: &[u8],
        index: u32,
    ) -> vello_cpu::peniko::FontData {
        self.cpu_fonts
            .entry((blob_id, index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.to_vec()),
                    index,
                )
            })
            .clone()
    }

    fn font_stack(&self, family: Option<&str>) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if let Some(f) = family.map(str::trim).filter(|f| !f.is_empty()) {
            parts.push(quote_family(f));
        }
        if let Some(d) = &self.default_family {
            parts.push(quote_family(d));
        }
        parts.push(quote_family(&self.bundled_family));
        parts.push(GENERIC_FALLBACK.to_owned());
        parts.join(", ")
    }
}

fn register_font_file(font_ctx: &mut parley::FontContext, path: &Path) -> ClipforgeResult<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        ClipforgeError::io(format!("read default font '{}': {e}", path.display()))
    })?;
    register_font_bytes(font_ctx, bytes, &path.display().to_string())
}

fn register_font_bytes(
    font_ctx: &mut parley::FontContext,
    bytes: Vec<u8>,
    source: &str,
) -> ClipforgeResult<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes), None);
    let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
        ClipforgeError::validation(format!("no font families registered from '{source}'"))
    })?;
    let name = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ClipforgeError::validation("registered font family has no name"))?
        .to_string();
    tracing::debug!(family = %name, source, "registered font");
    Ok(name)
}

fn quote_family(name: &str) -> String {
    if name.contains(' ') && !name.starts_with('"') {
        format!("\"{name}\"")
    } else {
        name.to_owned()
    }
}

/// Horizontal offset of a line of `advance` width inside a box of `box_width`.
pub(crate) fn align_offset(align: TextAlign, box_width: f32, advance: f32) -> f32 {
    let slack = (box_width - advance).max(0.0);
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => slack / 2.0,
        TextAlign::Right => slack,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
