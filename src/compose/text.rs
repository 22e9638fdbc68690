use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::fonts::{FontBook, ResolvedFont},
    compose::composite,
    foundation::{
        color::ColorRgba8,
        core::Canvas,
        error::{PhotostripError, PhotostripResult},
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<ColorRgba8> for TextBrushRgba8 {
    fn from(c: ColorRgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One line of caption text anchored on its baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionLine<'a> {
    pub text: &'a str,
    /// Horizontal center of the line in canvas pixels.
    pub center_x: f64,
    /// Baseline position in canvas pixels.
    pub baseline_y: f64,
}

/// Shapes caption lines with Parley and rasterizes them with `vello_cpu`.
pub struct TextRenderer {
    fonts: FontBook,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<String, RegisteredFont>,
}

#[derive(Clone)]
struct RegisteredFont {
    parley_family: String,
    data: vello_cpu::peniko::FontData,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(FontBook::with_system_fonts())
    }
}

impl TextRenderer {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        self.registered.clear();
        &mut self.fonts
    }

    /// Draw `lines` over a premultiplied RGBA8 canvas.
    pub fn draw_lines(
        &mut self,
        canvas: &mut [u8],
        size: Canvas,
        lines: &[CaptionLine<'_>],
        font_family: &str,
        font_size_px: f32,
        color: ColorRgba8,
    ) -> PhotostripResult<()> {
        if !font_size_px.is_finite() || font_size_px <= 0.0 {
            return Err(PhotostripError::validation(
                "font size must be finite and > 0",
            ));
        }
        if lines.iter().all(|l| l.text.trim().is_empty()) {
            return Ok(());
        }
        let width_u16: u16 = size
            .width
            .try_into()
            .map_err(|_| PhotostripError::validation("canvas width exceeds u16"))?;
        let height_u16: u16 = size
            .height
            .try_into()
            .map_err(|_| PhotostripError::validation("canvas height exceeds u16"))?;

        let font = self.register(font_family)?;
        let brush = TextBrushRgba8::from(color);

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            brush.r, brush.g, brush.b, brush.a,
        ));

        for line in lines {
            if line.text.trim().is_empty() {
                continue;
            }
            let layout = self.layout_line(line.text, &font.parley_family, font_size_px, brush);
            let line_width = f64::from(layout.width());
            let line_baseline = layout
                .lines()
                .next()
                .map(|l| f64::from(l.metrics().baseline))
                .unwrap_or(0.0);

            let dx = line.center_x - line_width / 2.0;
            let dy = line.baseline_y - line_baseline;
            ctx.set_transform(vello_cpu::kurbo::Affine::translate(
                vello_cpu::kurbo::Vec2::new(dx, dy),
            ));

            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font.data)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);
        composite::over_in_place(canvas, pixmap.data_as_u8_slice())
    }

    fn register(&mut self, font_family: &str) -> PhotostripResult<RegisteredFont> {
        if let Some(hit) = self.registered.get(font_family) {
            return Ok(hit.clone());
        }

        let resolved: Arc<ResolvedFont> = self.fonts.resolve(font_family)?;
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(resolved.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PhotostripError::font("no font families registered from font bytes"))?;
        let parley_family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PhotostripError::font("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(resolved.bytes.as_ref().clone()),
            resolved.index,
        );
        let registered = RegisteredFont {
            parley_family,
            data,
        };
        self.registered
            .insert(font_family.to_string(), registered.clone());
        Ok(registered)
    }

    fn layout_line(
        &mut self,
        text: &str,
        parley_family: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(parley_family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}
