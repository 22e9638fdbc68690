use crate::{
    assets::decode::{FrameGraphic, Photo, resample_premul},
    compose::{
        composite,
        text::{CaptionLine, TextRenderer},
    },
    foundation::{
        color::ColorRgba8,
        core::{Canvas, PixelRect},
        error::{PhotostripError, PhotostripResult},
    },
    layout::table::{FrameGeometry, Layout},
};

pub const MIN_FONT_SIZE: f32 = 10.0;
pub const MAX_FONT_SIZE: f32 = 100.0;
/// Extra leading added to the font size to get the caption line height.
pub const LINE_SPACING_PX: f32 = 7.0;

/// Styling snapshot for one composite.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background: ColorRgba8,
    /// Frame graphic reference (path or data URL); `None` selects the built-in border.
    pub frame: Option<String>,
    /// Caption text; `\n` separates lines.
    pub text: String,
    pub text_color: ColorRgba8,
    pub font_size: f32,
    /// CSS-style family stack, e.g. `"Pacifico, cursive"`.
    pub font_family: String,
    /// Literal date/time string rendered as an extra last caption line.
    pub stamp: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: ColorRgba8::WHITE,
            frame: None,
            text: String::new(),
            text_color: ColorRgba8::rgb(0x22, 0x22, 0x22),
            font_size: 28.0,
            font_family: "sans-serif".to_string(),
            stamp: None,
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> PhotostripResult<()> {
        if !self.font_size.is_finite()
            || !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size)
        {
            return Err(PhotostripError::validation(format!(
                "font size must be within {MIN_FONT_SIZE}..={MAX_FONT_SIZE} px, got {}",
                self.font_size
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(PhotostripError::validation("font family must be non-empty"));
        }
        Ok(())
    }

    /// Caption lines in draw order, empty when there is nothing to draw.
    pub fn caption_lines(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = if self.text.is_empty() {
            Vec::new()
        } else {
            self.text.split('\n').map(|l| l.trim_end_matches('\r')).collect()
        };
        if let Some(stamp) = self.stamp.as_deref().filter(|s| !s.is_empty()) {
            lines.push(stamp);
        }
        lines
    }

    pub fn line_height(&self) -> f32 {
        self.font_size + LINE_SPACING_PX
    }
}

/// Finished composite in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

impl Raster {
    pub fn size(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.rgba8_premul[i],
            self.rgba8_premul[i + 1],
            self.rgba8_premul[i + 2],
            self.rgba8_premul[i + 3],
        ]
    }
}

/// Where a photo of `width x height` lands inside `window`: uniform scale, centered.
pub fn fit_photo(width: u32, height: u32, window: PixelRect) -> PixelRect {
    let scale = (f64::from(window.width) / f64::from(width))
        .min(f64::from(window.height) / f64::from(height));
    let dw = ((f64::from(width) * scale).round() as u32).clamp(1, window.width);
    let dh = ((f64::from(height) * scale).round() as u32).clamp(1, window.height);
    PixelRect::new(
        window.x + i64::from((window.width - dw) / 2),
        window.y + i64::from((window.height - dh) / 2),
        dw,
        dh,
    )
}

/// Baselines for `n` caption lines, centered as a block on the caption band.
pub fn caption_baselines(
    canvas: Canvas,
    geometry: &FrameGeometry,
    n: usize,
    line_height: f32,
) -> Vec<f64> {
    let lh = f64::from(line_height);
    let center = f64::from(canvas.height) - f64::from(geometry.caption_band) / 2.0;
    let start = center - (n.saturating_sub(1) as f64) * lh / 2.0;
    (0..n).map(|i| start + (i as f64) * lh).collect()
}

/// Turns a full photo set plus frame and style into one strip image.
pub struct Compositor {
    geometry: FrameGeometry,
    text: TextRenderer,
}

impl Compositor {
    pub fn new(geometry: FrameGeometry) -> PhotostripResult<Self> {
        Self::with_text_renderer(geometry, TextRenderer::default())
    }

    pub fn with_text_renderer(
        geometry: FrameGeometry,
        text: TextRenderer,
    ) -> PhotostripResult<Self> {
        geometry.validate()?;
        Ok(Self { geometry, text })
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    pub fn text_renderer_mut(&mut self) -> &mut TextRenderer {
        &mut self.text
    }

    /// Compose `photos` (exactly `layout.count()`) into a finished raster.
    ///
    /// Draw order: background, then per cell the fitted photo clipped to its window and the
    /// frame graphic on top, then the caption. Output depends only on the inputs.
    #[tracing::instrument(skip_all, fields(layout = %layout, photos = photos.len()))]
    pub fn compose(
        &mut self,
        photos: &[Photo],
        frame: &FrameGraphic,
        layout: Layout,
        style: &StyleConfig,
    ) -> PhotostripResult<Raster> {
        if photos.len() != layout.count() {
            return Err(PhotostripError::IncompleteSet {
                expected: layout.count(),
                actual: photos.len(),
            });
        }
        style.validate()?;

        let geometry = self.geometry;
        let fitted;
        let frame = if frame.width == geometry.frame_width && frame.height == geometry.frame_height
        {
            frame
        } else {
            fitted = frame.clone().fit_to(&geometry)?;
            &fitted
        };

        let size = geometry.canvas_for(layout);
        let mut canvas = vec![0u8; size.byte_len()];
        composite::fill(&mut canvas, style.background.to_premul().to_array());

        for (i, photo) in photos.iter().enumerate() {
            let window = geometry.window_rect(layout, i);
            let place = fit_photo(photo.width, photo.height, window);
            let scaled = resample_premul(
                &photo.rgba8_premul,
                photo.width,
                photo.height,
                place.width,
                place.height,
            )?;
            composite::blit_over(
                &mut canvas,
                size,
                &scaled,
                Canvas {
                    width: place.width,
                    height: place.height,
                },
                place.x,
                place.y,
                window,
            )?;

            let cell = geometry.cell_rect(layout, i);
            composite::blit_over(
                &mut canvas,
                size,
                &frame.rgba8_premul,
                geometry.frame_size(),
                cell.x,
                cell.y,
                cell,
            )?;
        }

        let lines = style.caption_lines();
        if !lines.is_empty() {
            let baselines = caption_baselines(size, &geometry, lines.len(), style.line_height());
            let center_x = f64::from(size.width) / 2.0;
            let caption: Vec<CaptionLine<'_>> = lines
                .iter()
                .zip(baselines)
                .map(|(&text, baseline_y)| CaptionLine {
                    text,
                    center_x,
                    baseline_y,
                })
                .collect();
            self.text.draw_lines(
                &mut canvas,
                size,
                &caption,
                &style.font_family,
                style.font_size,
                style.text_color,
            )?;
        }

        tracing::debug!(width = size.width, height = size.height, "composite ready");
        Ok(Raster {
            width: size.width,
            height: size.height,
            rgba8_premul: canvas,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
