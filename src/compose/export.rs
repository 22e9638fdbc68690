use std::{io::Cursor, path::Path};

use anyhow::Context;

use crate::{
    assets::source::encode_data_url,
    compose::compositor::Raster,
    foundation::{
        core::unpremultiply_rgba8_in_place,
        error::{PhotostripError, PhotostripResult},
    },
};

/// File name offered for the downloaded strip.
pub const DEFAULT_DOWNLOAD_NAME: &str = "photobooth-photo.png";

/// Straight-alpha RGBA8 copy of the raster, as image encoders expect.
pub fn to_straight_rgba8(raster: &Raster) -> Vec<u8> {
    let mut data = raster.rgba8_premul.clone();
    unpremultiply_rgba8_in_place(&mut data);
    data
}

/// Encode the raster as PNG bytes.
pub fn encode_png(raster: &Raster) -> PhotostripResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(raster.width, raster.height, to_straight_rgba8(raster))
        .ok_or_else(|| PhotostripError::validation("raster buffer does not match its size"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// `data:image/png;base64,...` form for inline display.
pub fn to_png_data_url(raster: &Raster) -> PhotostripResult<String> {
    Ok(encode_data_url("image/png", &encode_png(raster)?))
}

pub fn write_png(raster: &Raster, path: &Path) -> PhotostripResult<()> {
    let bytes = encode_png(raster)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
