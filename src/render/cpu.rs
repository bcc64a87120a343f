use crate::{
    assets::{
        decode::BaseImage,
        font::{FontFace, TextLayoutEngine},
    },
    compose::plan::{CompositePlan, DrawOp},
    foundation::{
        core::{Point, Rgba8},
        error::{CollageError, CollageResult},
    },
    render::{
        backend::{CancelToken, CompositeBackend, FlattenedImage, RenderSettings},
        composite::over_in_place,
    },
};

/// Horizontal advance of a placeholder glyph, as a fraction of the font size.
const PLACEHOLDER_ADVANCE: f64 = 0.6;
/// Width of a placeholder block, as a fraction of the font size.
const PLACEHOLDER_WIDTH: f64 = 0.5;
/// Height of a placeholder block, as a fraction of the font size.
const PLACEHOLDER_HEIGHT: f64 = 0.7;
/// Line pitch for multi-line placeholder text, as a fraction of the font size.
const PLACEHOLDER_LINE_HEIGHT: f64 = 1.2;

/// CPU compositor: copies the base pixels, rasterizes overlays onto a transparent layer with
/// `vello_cpu`, then composites the layer source-over the base.
pub struct CpuBackend {
    settings: RenderSettings,
    text_engine: TextLayoutEngine,
    font_data: Option<vello_cpu::peniko::FontData>,
}

impl CpuBackend {
    /// Create a backend from settings.
    pub fn new(settings: RenderSettings) -> Self {
        let font_data = settings.font.as_ref().map(|f| {
            vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(f.bytes.as_ref().clone()),
                0,
            )
        });
        Self {
            settings,
            text_engine: TextLayoutEngine::new(),
            font_data,
        }
    }
}

impl CompositeBackend for CpuBackend {
    fn render_plan(
        &mut self,
        plan: &CompositePlan,
        base: &BaseImage,
        cancel: &CancelToken,
    ) -> CollageResult<FlattenedImage> {
        if plan.width != base.width || plan.height != base.height {
            return Err(CollageError::invalid_argument(format!(
                "plan is {}x{} but base image is {}x{}",
                plan.width, plan.height, base.width, base.height
            )));
        }
        let (w, h) = surface_dims(plan.width, plan.height)?;

        let _span = tracing::debug_span!("cpu_composite", width = plan.width, height = plan.height)
            .entered();

        let mut data = base.rgba8_premul.as_ref().clone();
        if !plan.ops.is_empty() {
            let mut ctx = vello_cpu::RenderContext::new(w, h);
            for op in &plan.ops {
                if cancel.is_cancelled() {
                    return Err(CollageError::Cancelled);
                }
                self.draw_op(&mut ctx, op)?;
            }
            ctx.flush();

            let mut layer = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut layer);
            if cancel.is_cancelled() {
                return Err(CollageError::Cancelled);
            }
            over_in_place(&mut data, layer.data_as_u8_slice())?;
        } else if cancel.is_cancelled() {
            return Err(CollageError::Cancelled);
        }

        Ok(FlattenedImage {
            width: plan.width,
            height: plan.height,
            data,
            premultiplied: true,
        })
    }
}

impl CpuBackend {
    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, op: &DrawOp) -> CollageResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::Text {
                text,
                image_position,
                font_size_px,
                color,
                ..
            } => {
                let font = match (&self.settings.font, &self.font_data) {
                    (Some(face), Some(data)) => Some((face.clone(), data.clone())),
                    _ => None,
                };
                match font {
                    Some((face, data)) => self.draw_glyphs(
                        ctx,
                        &face,
                        &data,
                        text,
                        *image_position,
                        *font_size_px,
                        *color,
                    ),
                    None => {
                        draw_placeholder_text(ctx, text, *image_position, *font_size_px, *color);
                        Ok(())
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_glyphs(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        face: &FontFace,
        font_data: &vello_cpu::peniko::FontData,
        text: &str,
        center: Point,
        font_size_px: f32,
        color: Rgba8,
    ) -> CollageResult<()> {
        let layout = self
            .text_engine
            .layout_plain(text, face, font_size_px, color)?;
        let left = center.x - f64::from(layout.width()) / 2.0;
        let top = center.y - f64::from(layout.height()) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((left, top)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush.0;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

/// Draw each non-whitespace character as a solid block with nominal glyph metrics.
fn draw_placeholder_text(
    ctx: &mut vello_cpu::RenderContext,
    text: &str,
    center: Point,
    font_size_px: f32,
    color: Rgba8,
) {
    let size = f64::from(font_size_px);
    let advance = size * PLACEHOLDER_ADVANCE;
    let inset = (advance - size * PLACEHOLDER_WIDTH) / 2.0;
    let line_height = size * PLACEHOLDER_LINE_HEIGHT;

    let lines: Vec<&str> = text.lines().collect();
    let block_height = line_height * (lines.len().max(1) as f64 - 1.0) + size * PLACEHOLDER_HEIGHT;
    let first_top = center.y - block_height / 2.0;

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));

    for (row, line) in lines.iter().enumerate() {
        let top = first_top + row as f64 * line_height;
        let left = center.x - (line.chars().count() as f64 * advance) / 2.0;
        for (col, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = left + col as f64 * advance + inset;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                x0,
                top,
                x0 + size * PLACEHOLDER_WIDTH,
                top + size * PLACEHOLDER_HEIGHT,
            ));
        }
    }
}

fn surface_dims(width: u32, height: u32) -> CollageResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CollageError::invalid_argument("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CollageError::invalid_argument("image height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
