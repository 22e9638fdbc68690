use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_on_white() {
    let out = over([255, 255, 255, 255], [0, 0, 128, 128]);
    assert_eq!(out, [127, 127, 255, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
}

#[test]
fn blit_is_clipped_to_rect_and_destination() {
    let dst_size = Canvas {
        width: 4,
        height: 4,
    };
    let mut dst = vec![0u8; dst_size.byte_len()];
    let src_size = Canvas {
        width: 3,
        height: 3,
    };
    let src = [9u8, 9, 9, 255].repeat(9);

    // Source covers (2..5, 2..5), clip allows (0..3, 0..4): only x=2, y=2..4 are written.
    blit_over(
        &mut dst,
        dst_size,
        &src,
        src_size,
        2,
        2,
        PixelRect::new(0, 0, 3, 4),
    )
    .unwrap();

    let written: Vec<(usize, usize)> = (0..4)
        .flat_map(|y| (0..4).map(move |x| (x, y)))
        .filter(|&(x, y)| dst[(y * 4 + x) * 4 + 3] != 0)
        .collect();
    assert_eq!(written, vec![(2, 2), (2, 3)]);
}

#[test]
fn blit_fully_outside_is_noop() {
    let size = Canvas {
        width: 2,
        height: 2,
    };
    let mut dst = vec![0u8; size.byte_len()];
    let src = vec![255u8; size.byte_len()];
    blit_over(&mut dst, size, &src, size, -5, -5, PixelRect::new(0, 0, 2, 2)).unwrap();
    assert!(dst.iter().all(|&b| b == 0));
}
