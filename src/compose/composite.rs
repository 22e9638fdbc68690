use crate::foundation::{
    core::{Canvas, PixelRect},
    error::{PhotostripError, PhotostripResult},
};

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

pub fn fill(dst: &mut [u8], px: PremulRgba8) {
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> PhotostripResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PhotostripError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Blend `src` (of size `src_size`) over `dst` with its top-left at `(at_x, at_y)`.
///
/// Only pixels inside `clip` (and inside the destination) are touched.
pub fn blit_over(
    dst: &mut [u8],
    dst_size: Canvas,
    src: &[u8],
    src_size: Canvas,
    at_x: i64,
    at_y: i64,
    clip: PixelRect,
) -> PhotostripResult<()> {
    if dst.len() != dst_size.byte_len() || src.len() != src_size.byte_len() {
        return Err(PhotostripError::validation(
            "blit_over buffer length does not match its size",
        ));
    }

    let dst_bounds = PixelRect::new(0, 0, dst_size.width, dst_size.height);
    let src_bounds = PixelRect::new(at_x, at_y, src_size.width, src_size.height);
    let Some(area) = dst_bounds
        .intersect(clip)
        .and_then(|r| r.intersect(src_bounds))
    else {
        return Ok(());
    };

    let dst_stride = dst_size.width as usize * 4;
    let src_stride = src_size.width as usize * 4;
    let row_len = area.width as usize * 4;
    for y in area.y..area.bottom() {
        let d0 = y as usize * dst_stride + area.x as usize * 4;
        let s0 = (y - at_y) as usize * src_stride + (area.x - at_x) as usize * 4;
        let d_row = &mut dst[d0..d0 + row_len];
        let s_row = &src[s0..s0 + row_len];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composite.rs"]
mod tests;
