use std::path::Path;

use kurbo::Shape;

use crate::foundation::core::Resolution;
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::render::color::{BLACK, PLACEHOLDER_GREY, WHITE, resolve_color};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine, align_offset};
use crate::scene::model::{Element, Scene};
use crate::scene::props::{ElementProps, ImageProps, ShapeProps, ShapeType, TextProps};

const PATH_TOLERANCE: f64 = 0.1;
const PLACEHOLDER_LABEL: &str = "Image";
const PLACEHOLDER_LABEL_INSET: f64 = 10.0;
const PLACEHOLDER_LABEL_SIZE: f32 = 14.0;

/// Pixel-space rectangle of an element (top-left anchored).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PixelBox {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) w: f64,
    pub(crate) h: f64,
}

impl PixelBox {
    /// Map percentage geometry onto the canvas, truncating to whole pixels.
    pub(crate) fn for_element(el: &Element, res: Resolution) -> Self {
        let cw = f64::from(res.width);
        let ch = f64::from(res.height);
        Self {
            x: (el.position.x / 100.0 * cw).trunc(),
            y: (el.position.y / 100.0 * ch).trunc(),
            w: (el.size.width / 100.0 * cw).trunc(),
            h: (el.size.height / 100.0 * ch).trunc(),
        }
    }

    fn rect(self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    fn is_empty(self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// CPU rasterizer for a single scene's still frame.
///
/// One renderer owns one `vello_cpu` context, pixmap and text engine; parallel rendering
/// creates one per worker.
pub struct FrameRenderer {
    resolution: Resolution,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    text: TextLayoutEngine,
    warned_no_glyphs: bool,
}

impl FrameRenderer {
    pub fn new(resolution: Resolution, default_font: Option<&Path>) -> ClipforgeResult<Self> {
        let w: u16 = resolution
            .width
            .try_into()
            .map_err(|_| ClipforgeError::composition("frame width exceeds u16"))?;
        let h: u16 = resolution
            .height
            .try_into()
            .map_err(|_| ClipforgeError::composition("frame height exceeds u16"))?;
        Ok(Self {
            resolution,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            text: TextLayoutEngine::new(default_font)?,
            warned_no_glyphs: false,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Paint `scene` over a black canvas and return the RGBA8 bytes (row-major, opaque).
    ///
    /// Elements are painted in array order. Video, audio and effect elements have no visual.
    pub fn render_scene(&mut self, scene: &Scene) -> ClipforgeResult<&[u8]> {
        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        set_paint(&mut self.ctx, BLACK);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.resolution.width),
            f64::from(self.resolution.height),
        ));

        for el in &scene.elements {
            let bx = PixelBox::for_element(el, self.resolution);
            if bx.is_empty() {
                continue;
            }
            match &el.props {
                ElementProps::Text(p) => self.draw_text(p, bx)?,
                ElementProps::Shape(p) => self.draw_shape(p, bx),
                ElementProps::Image(p) => self.draw_image_placeholder(p, bx)?,
                ElementProps::Other { .. } => {}
            }
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(self.pixmap.data_as_u8_slice())
    }

    /// Render `scene` and write it as a PNG file.
    pub fn render_to_png(&mut self, scene: &Scene, path: &Path) -> ClipforgeResult<()> {
        let Resolution { width, height } = self.resolution;
        let data = self.render_scene(scene)?;
        image::save_buffer_with_format(
            path,
            data,
            width,
            height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| ClipforgeError::io(format!("write frame '{}': {e}", path.display())))
    }

    fn draw_text(&mut self, p: &TextProps, bx: PixelBox) -> ClipforgeResult<()> {
        let color = resolve_color(p.color.as_deref(), WHITE);
        let text = p.text_or_default();
        let layout = self.text.layout(
            text,
            p.font_family.as_deref(),
            p.font_size_or_default() as f32,
            TextBrushRgba8::from(color),
            Some(bx.w as f32),
        )?;
        let align = p.text_align.unwrap_or_default();
        if !self.warned_no_glyphs && !text.trim().is_empty() && !has_glyph_runs(&layout) {
            self.warned_no_glyphs = true;
            tracing::warn!(
                font_family = p.font_family.as_deref().unwrap_or(""),
                "text layout produced no glyphs; no usable font was found"
            );
        }

        for line in layout.lines() {
            let m = line.metrics();
            // Lines are top-to-bottom, so the first overflowing line ends the block.
            if f64::from(m.baseline + m.descent) > bx.h {
                break;
            }
            let dx = f64::from(align_offset(align, bx.w as f32, m.advance));
            self.ctx
                .set_transform(vello_cpu::kurbo::Affine::translate((bx.x + dx, bx.y)));
            self.fill_line(&line);
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn fill_line(&mut self, line: &parley::layout::Line<'_, TextBrushRgba8>) {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let font = run.run().font();
            let cpu_font = self
                .text
                .cpu_font(font.data.id(), font.data.data(), font.index);
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            self.ctx
                .glyph_run(&cpu_font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }

    fn draw_shape(&mut self, p: &ShapeProps, bx: PixelBox) {
        let path = shape_path(p.shape_type.unwrap_or_default(), bx);
        set_paint(&mut self.ctx, resolve_color(p.fill_color.as_deref(), WHITE));
        self.ctx.fill_path(&bezpath_to_cpu(&path));

        let stroke_width = p.stroke_width.unwrap_or(0.0);
        if let Some(stroke_color) = p.stroke_color.as_deref()
            && stroke_width > 0.0
        {
            let outline = kurbo::stroke(
                path.iter(),
                &kurbo::Stroke::new(stroke_width),
                &kurbo::StrokeOpts::default(),
                PATH_TOLERANCE,
            );
            set_paint(&mut self.ctx, resolve_color(Some(stroke_color), WHITE));
            self.ctx.fill_path(&bezpath_to_cpu(&outline));
        }
    }

    fn draw_image_placeholder(&mut self, p: &ImageProps, bx: PixelBox) -> ClipforgeResult<()> {
        if p.src.as_deref().is_none_or(str::is_empty) {
            return Ok(());
        }
        set_paint(&mut self.ctx, PLACEHOLDER_GREY);
        self.ctx.fill_path(&bezpath_to_cpu(&bx.rect().to_path(PATH_TOLERANCE)));

        let layout = self.text.layout(
            PLACEHOLDER_LABEL,
            None,
            PLACEHOLDER_LABEL_SIZE,
            TextBrushRgba8::from(WHITE),
            None,
        )?;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            bx.x + PLACEHOLDER_LABEL_INSET,
            bx.y + PLACEHOLDER_LABEL_INSET,
        )));
        for line in layout.lines() {
            self.fill_line(&line);
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

pub(crate) fn shape_path(kind: ShapeType, bx: PixelBox) -> kurbo::BezPath {
    let rect = bx.rect();
    match kind {
        ShapeType::Rectangle => rect.to_path(PATH_TOLERANCE),
        ShapeType::Circle => kurbo::Ellipse::from_rect(rect).to_path(PATH_TOLERANCE),
        ShapeType::Triangle => {
            let mut path = kurbo::BezPath::new();
            path.move_to((rect.x0 + rect.width() / 2.0, rect.y0));
            path.line_to((rect.x1, rect.y1));
            path.line_to((rect.x0, rect.y1));
            path.close_path();
            path
        }
    }
}

fn has_glyph_runs(layout: &parley::Layout<TextBrushRgba8>) -> bool {
    layout.lines().any(|line| {
        line.items()
            .any(|item| matches!(item, parley::layout::PositionedLayoutItem::GlyphRun(_)))
    })
}

fn set_paint(ctx: &mut vello_cpu::RenderContext, [r, g, b, a]: [u8; 4]) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
