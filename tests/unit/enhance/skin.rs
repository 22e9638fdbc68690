use super::*;

const SKIN: [u8; 4] = [224, 172, 138, 255];
const SKY: [u8; 4] = [40, 90, 220, 255];

/// Left half skin, right half sky, with a bright speck in the middle of the skin half.
fn half_and_half(w: u32, h: u32) -> Photo {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let px = if x == w / 4 && y == h / 2 {
                [250, 200, 180, 255]
            } else if x < w / 2 {
                SKIN
            } else {
                SKY
            };
            data.extend_from_slice(&px);
        }
    }
    Photo::from_premul(w, h, data).unwrap()
}

fn at(p: &Photo, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * p.width + x) * 4) as usize;
    [
        p.rgba8_premul[i],
        p.rgba8_premul[i + 1],
        p.rgba8_premul[i + 2],
        p.rgba8_premul[i + 3],
    ]
}

#[test]
fn skin_rule_accepts_skin_tones_and_rejects_others() {
    assert!(is_skin_rgb(SKIN[0], SKIN[1], SKIN[2]));
    assert!(!is_skin_rgb(SKY[0], SKY[1], SKY[2]));
    assert!(!is_skin_rgb(128, 128, 128));
    assert!(!is_skin_rgb(30, 20, 10));
}

#[test]
fn smoothing_only_touches_skin_pixels() {
    let p = half_and_half(16, 8);
    let opts = FilterOptions {
        skin_smoothing: 0.3,
        ..FilterOptions::default()
    };
    let out = SkinSmoothing::default().enhance(&p, &opts).unwrap();

    // The speck is softened toward its skin neighbours.
    let speck = at(&out, 4, 4);
    assert!(speck[0] < 250);
    // Sky pixels far from the boundary are exactly preserved.
    assert_eq!(at(&out, 15, 0), SKY);
    assert_eq!(at(&out, 12, 7), SKY);
}

#[test]
fn zero_smoothing_with_no_adjustments_is_identity() {
    let p = half_and_half(8, 4);
    let out = SkinSmoothing::default()
        .enhance(&p, &FilterOptions::default())
        .unwrap();
    assert_eq!(out, p);
}

#[test]
fn oversized_photo_fails_with_enhancement_error() {
    let p = half_and_half(8, 8);
    let limited = SkinSmoothing { max_pixels: 32 };
    let opts = FilterOptions {
        skin_smoothing: 0.5,
        ..FilterOptions::default()
    };
    let err = limited.enhance(&p, &opts).unwrap_err();
    assert!(matches!(err, PhotostripError::Enhancement(_)));
}

#[test]
fn skin_bounds_are_padded_and_clamped() {
    let (w, h) = (10u32, 6u32);
    let mut mask = vec![false; (w * h) as usize];
    mask[(2 * w + 1) as usize] = true;
    mask[(3 * w + 4) as usize] = true;
    assert_eq!(
        skin_bounds(&mask, w, 2),
        Some(Region {
            x: 0,
            y: 0,
            width: 7,
            height: 6
        })
    );
    assert_eq!(skin_bounds(&[false; 60], w, 2), None);
}

#[test]
fn photo_without_skin_is_left_alone() {
    let sky = Photo::from_premul(6, 4, SKY.repeat(24)).unwrap();
    let opts = FilterOptions {
        skin_smoothing: 1.0,
        ..FilterOptions::default()
    };
    let out = SkinSmoothing::default().enhance(&sky, &opts).unwrap();
    assert_eq!(out, sky);
}
