use rayon::prelude::*;

use crate::{
    assets::decode::Photo,
    enhance::filter::{Enhancer, FilterOptions, GlobalAdjust},
};

/// Enhance one photo, degrading to [`GlobalAdjust`] and finally to the untouched photo.
///
/// Never fails: an enhancement problem must not block exporting the strip.
pub fn enhance_with_fallback(
    enhancer: &dyn Enhancer,
    photo: &Photo,
    options: &FilterOptions,
) -> Photo {
    match enhancer.enhance(photo, options) {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(
                enhancer = enhancer.name(),
                error = %err,
                "enhancement failed, falling back to global adjustment"
            );
            GlobalAdjust.enhance(photo, options).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "global adjustment failed, using unfiltered photo");
                photo.clone()
            })
        }
    }
}

/// Enhance every photo of a set in parallel, preserving order.
pub fn enhance_all(
    enhancer: &dyn Enhancer,
    photos: &[Photo],
    options: &FilterOptions,
) -> Vec<Photo> {
    if options.is_identity() {
        return photos.to_vec();
    }
    photos
        .par_iter()
        .map(|p| enhance_with_fallback(enhancer, p, options))
        .collect()
}
