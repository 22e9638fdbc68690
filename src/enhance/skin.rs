use std::sync::Arc;

use crate::{
    assets::decode::Photo,
    enhance::filter::{Enhancer, FilterOptions, adjust_rgba8_premul_in_place},
    foundation::error::{PhotostripError, PhotostripResult},
};

/// Skin smoothing driven by an RGB-threshold skin classifier.
///
/// Skin pixels are replaced by a gaussian-blurred copy of the region around them, then the
/// global brightness/contrast/saturation adjustments are applied to the whole image.
#[derive(Clone, Copy, Debug)]
pub struct SkinSmoothing {
    /// Photos larger than this are refused.
    pub max_pixels: u64,
}

impl Default for SkinSmoothing {
    fn default() -> Self {
        Self {
            max_pixels: 4096 * 4096,
        }
    }
}

impl Enhancer for SkinSmoothing {
    fn name(&self) -> &'static str {
        "skin-smoothing"
    }

    #[tracing::instrument(skip_all, fields(w = photo.width, h = photo.height))]
    fn enhance(&self, photo: &Photo, options: &FilterOptions) -> PhotostripResult<Photo> {
        options
            .validate()
            .map_err(|e| PhotostripError::enhancement(e.to_string()))?;
        let pixels = u64::from(photo.width) * u64::from(photo.height);
        if pixels > self.max_pixels {
            return Err(PhotostripError::enhancement(format!(
                "photo has {pixels} pixels, smoothing supports at most {}",
                self.max_pixels
            )));
        }

        let mut data = photo.rgba8_premul.as_ref().clone();
        let radius = options.smoothing_radius_px();
        if radius > 0 {
            let mask = skin_mask(&data);
            let skin = mask.iter().filter(|&&m| m).count();
            if let Some(region) = skin_bounds(&mask, photo.width, radius.saturating_mul(2)) {
                data = smooth_region(data, photo.width, photo.height, &mask, region, radius)?;
            }
            tracing::debug!(skin_pixels = skin, radius, "skin smoothing applied");
        }

        adjust_rgba8_premul_in_place(
            &mut data,
            options.brightness_factor(),
            options.contrast_factor(),
            options.saturation_factor(),
        );
        Ok(Photo {
            width: photo.width,
            height: photo.height,
            rgba8_premul: Arc::new(data),
        })
    }
}

/// Blur `region` of the photo and write the result back over its skin pixels only.
fn smooth_region(
    data: Vec<u8>,
    width: u32,
    height: u32,
    mask: &[bool],
    region: Region,
    radius: u32,
) -> PhotostripResult<Vec<u8>> {
    let mut img = image::RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| PhotostripError::enhancement("photo buffer does not match its size"))?;
    let crop = image::imageops::crop_imm(&img, region.x, region.y, region.width, region.height)
        .to_image();
    let sigma = (radius as f32 / 2.0).max(0.5);
    let blurred = image::imageops::blur(&crop, sigma);
    for (cx, cy, px) in blurred.enumerate_pixels() {
        let (x, y) = (region.x + cx, region.y + cy);
        if mask[(y * width + x) as usize] {
            img.put_pixel(x, y, *px);
        }
    }
    Ok(img.into_raw())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Region {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Bounding box of the skin pixels grown by `pad` on every side, clamped to the photo.
fn skin_bounds(mask: &[bool], width: u32, pad: u32) -> Option<Region> {
    if width == 0 {
        return None;
    }
    let height = (mask.len() / width as usize) as u32;
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0, 0);
    for (i, _) in mask.iter().enumerate().filter(|(_, m)| **m) {
        let (x, y) = (i as u32 % width, i as u32 / width);
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    if x0 == u32::MAX {
        return None;
    }
    let x = x0.saturating_sub(pad);
    let y = y0.saturating_sub(pad);
    Some(Region {
        x,
        y,
        width: x1.saturating_add(pad).min(width - 1) - x + 1,
        height: y1.saturating_add(pad).min(height - 1) - y + 1,
    })
}

/// Classic RGB skin rule evaluated on straight-alpha colors; transparent pixels are never skin.
pub fn is_skin_rgb(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && max - min > 15 && (r - g).abs() > 15 && r > g && r > b
}

fn skin_mask(rgba8_premul: &[u8]) -> Vec<bool> {
    rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            let a = u16::from(px[3]);
            if a == 0 {
                return false;
            }
            let straight = |c: u8| ((u16::from(c) * 255 + a / 2) / a).min(255) as u8;
            is_skin_rgb(straight(px[0]), straight(px[1]), straight(px[2]))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/enhance/skin.rs"]
mod tests;
