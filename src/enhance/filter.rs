use std::sync::Arc;

use crate::{
    assets::decode::Photo,
    foundation::error::{PhotostripError, PhotostripResult},
};

/// Enhancement strengths, each in `0.0..=1.0` (0 disables that adjustment).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub skin_smoothing: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl FilterOptions {
    pub fn validate(&self) -> PhotostripResult<()> {
        for (name, v) in [
            ("skin_smoothing", self.skin_smoothing),
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(PhotostripError::validation(format!(
                    "filter option {name} must be within 0..=1, got {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        self.skin_smoothing <= 0.0
            && self.brightness <= 0.0
            && self.contrast <= 0.0
            && self.saturation <= 0.0
    }

    /// Multiplier for `brightness()`: `1 + b`.
    pub fn brightness_factor(&self) -> Option<f32> {
        (self.brightness > 0.0).then(|| 1.0 + self.brightness)
    }

    /// Multiplier for `contrast()`: `1 + 2c`.
    pub fn contrast_factor(&self) -> Option<f32> {
        (self.contrast > 0.0).then(|| 1.0 + self.contrast * 2.0)
    }

    /// Amount for `saturate()`: `1 + 2s`.
    pub fn saturation_factor(&self) -> Option<f32> {
        (self.saturation > 0.0).then(|| 1.0 + self.saturation * 2.0)
    }

    /// Gaussian blur radius used by skin smoothing.
    pub fn smoothing_radius_px(&self) -> u32 {
        (self.skin_smoothing.max(0.0) * 10.0).round() as u32
    }
}

/// Image-enhancement collaborator invoked per photo before compositing.
///
/// Implementations must be pure with respect to their inputs; errors are recovered by the
/// caller (see [`crate::enhance_with_fallback`]).
pub trait Enhancer: Send + Sync {
    fn name(&self) -> &'static str;

    fn enhance(&self, photo: &Photo, options: &FilterOptions) -> PhotostripResult<Photo>;
}

/// Returns the photo untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEnhancer;

impl Enhancer for NoopEnhancer {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn enhance(&self, photo: &Photo, _options: &FilterOptions) -> PhotostripResult<Photo> {
        Ok(photo.clone())
    }
}

/// Whole-image brightness, contrast and saturation.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalAdjust;

impl Enhancer for GlobalAdjust {
    fn name(&self) -> &'static str {
        "global-adjust"
    }

    fn enhance(&self, photo: &Photo, options: &FilterOptions) -> PhotostripResult<Photo> {
        options.validate().map_err(|e| PhotostripError::enhancement(e.to_string()))?;
        let b = options.brightness_factor();
        let c = options.contrast_factor();
        let s = options.saturation_factor();
        if b.is_none() && c.is_none() && s.is_none() {
            return Ok(photo.clone());
        }

        let mut data = photo.rgba8_premul.as_ref().clone();
        adjust_rgba8_premul_in_place(&mut data, b, c, s);
        Ok(Photo {
            width: photo.width,
            height: photo.height,
            rgba8_premul: Arc::new(data),
        })
    }
}

/// Apply the factors in filter-list order, clamping after each step.
pub(crate) fn adjust_rgba8_premul_in_place(
    rgba: &mut [u8],
    brightness: Option<f32>,
    contrast: Option<f32>,
    saturation: Option<f32>,
) {
    let sat = saturation.map(saturation_matrix);
    for px in rgba.chunks_exact_mut(4) {
        let a = f32::from(px[3]) / 255.0;
        if a <= 0.0 {
            continue;
        }
        let mut rgb = [
            f32::from(px[0]) / 255.0 / a,
            f32::from(px[1]) / 255.0 / a,
            f32::from(px[2]) / 255.0 / a,
        ];

        if let Some(f) = brightness {
            for v in &mut rgb {
                *v = (*v * f).clamp(0.0, 1.0);
            }
        }
        if let Some(f) = contrast {
            for v in &mut rgb {
                *v = ((*v - 0.5) * f + 0.5).clamp(0.0, 1.0);
            }
        }
        if let Some(m) = &sat {
            let [r, g, b] = rgb;
            for (i, v) in rgb.iter_mut().enumerate() {
                *v = (m[i][0] * r + m[i][1] * g + m[i][2] * b).clamp(0.0, 1.0);
            }
        }

        for (i, v) in rgb.iter().enumerate() {
            px[i] = (v * a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn saturation_matrix(s: f32) -> [[f32; 3]; 3] {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/enhance/filter.rs"]
mod tests;
