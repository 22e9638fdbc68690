use std::sync::Arc;

use anyhow::Context;

use crate::{
    foundation::core::premultiply_rgba8_in_place,
    foundation::error::{PhotostripError, PhotostripResult},
    layout::table::FrameGeometry,
};

/// Decoded source photo in premultiplied RGBA8 form.
///
/// Pixel storage is shared, so cloning a photo (or a whole photo set) never copies pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Photo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Photo {
    /// Wrap already-premultiplied pixels, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> PhotostripResult<Self> {
        check_len(width, height, rgba8_premul.len())?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }
}

/// Decoded frame graphic, always stored at the geometry's frame size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameGraphic {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl FrameGraphic {
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> PhotostripResult<Self> {
        check_len(width, height, rgba8_premul.len())?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// A solid-color frame with a fully transparent photo window.
    pub fn plain_border(geometry: &FrameGeometry, color: crate::ColorRgba8) -> Self {
        let px = color.to_premul().to_array();
        let (w, h) = (geometry.frame_width, geometry.frame_height);
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for y in 0..h {
            for x in 0..w {
                let in_window = x >= geometry.window_x
                    && x - geometry.window_x < geometry.window_width
                    && y >= geometry.window_y
                    && y - geometry.window_y < geometry.window_height;
                if in_window {
                    data.extend_from_slice(&[0, 0, 0, 0]);
                } else {
                    data.extend_from_slice(&px);
                }
            }
        }
        Self {
            width: w,
            height: h,
            rgba8_premul: Arc::new(data),
        }
    }

    /// Resample to the geometry's frame size if needed.
    pub fn fit_to(self, geometry: &FrameGeometry) -> PhotostripResult<Self> {
        if self.width == geometry.frame_width && self.height == geometry.frame_height {
            return Ok(self);
        }
        let data = resample_premul(
            &self.rgba8_premul,
            self.width,
            self.height,
            geometry.frame_width,
            geometry.frame_height,
        )?;
        Ok(Self {
            width: geometry.frame_width,
            height: geometry.frame_height,
            rgba8_premul: Arc::new(data),
        })
    }
}

fn check_len(width: u32, height: u32, len: usize) -> PhotostripResult<()> {
    if width == 0 || height == 0 {
        return Err(PhotostripError::decode("image has zero width or height"));
    }
    if len != width as usize * height as usize * 4 {
        return Err(PhotostripError::decode(format!(
            "rgba8 buffer length {len} does not match {width}x{height}"
        )));
    }
    Ok(())
}

/// Decode encoded raster bytes (PNG, JPEG, ...) into a premultiplied [`Photo`].
pub fn decode_photo(bytes: &[u8]) -> PhotostripResult<Photo> {
    let (width, height, rgba8_premul) = decode_raster(bytes)?;
    Ok(Photo {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Decode a frame graphic (raster or SVG) at the geometry's frame size.
pub fn decode_frame(bytes: &[u8], geometry: &FrameGeometry) -> PhotostripResult<FrameGraphic> {
    if looks_like_svg(bytes) {
        let data = rasterize_svg(bytes, geometry.frame_width, geometry.frame_height)?;
        return FrameGraphic::from_premul(geometry.frame_width, geometry.frame_height, data);
    }
    let (width, height, data) = decode_raster(bytes)?;
    FrameGraphic::from_premul(width, height, data)?.fit_to(geometry)
}

fn decode_raster(bytes: &[u8]) -> PhotostripResult<(u32, u32, Vec<u8>)> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| PhotostripError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PhotostripError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Ok((width, height, rgba8_premul))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

fn rasterize_svg(bytes: &[u8], width: u32, height: u32) -> PhotostripResult<Vec<u8>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| PhotostripError::decode(format!("parse svg tree: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PhotostripError::decode("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(&tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

/// Resample premultiplied RGBA8 with a triangle filter.
pub(crate) fn resample_premul(
    src: &[u8],
    width: u32,
    height: u32,
    new_width: u32,
    new_height: u32,
) -> PhotostripResult<Vec<u8>> {
    if width == new_width && height == new_height {
        return Ok(src.to_vec());
    }
    let img = image::RgbaImage::from_raw(width, height, src.to_vec())
        .ok_or_else(|| PhotostripError::decode("rgba8 buffer does not match dimensions"))?;
    let resized = image::imageops::resize(
        &img,
        new_width.max(1),
        new_height.max(1),
        image::imageops::FilterType::Triangle,
    );
    Ok(resized.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
