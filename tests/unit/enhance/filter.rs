use super::*;

fn photo(px: [u8; 4]) -> Photo {
    Photo::from_premul(2, 2, px.repeat(4)).unwrap()
}

#[test]
fn factors_follow_the_booth_formulas() {
    let opts = FilterOptions {
        skin_smoothing: 0.5,
        brightness: 0.2,
        contrast: 0.25,
        saturation: 0.5,
    };
    assert!((opts.brightness_factor().unwrap() - 1.2).abs() < 1e-6);
    assert_eq!(opts.contrast_factor(), Some(1.5));
    assert_eq!(opts.saturation_factor(), Some(2.0));
    assert_eq!(opts.smoothing_radius_px(), 5);

    let off = FilterOptions::default();
    assert!(off.is_identity());
    assert_eq!(off.brightness_factor(), None);
    assert_eq!(off.contrast_factor(), None);
    assert_eq!(off.saturation_factor(), None);
}

#[test]
fn validate_rejects_out_of_range() {
    let bad = FilterOptions {
        brightness: 1.5,
        ..FilterOptions::default()
    };
    assert!(bad.validate().is_err());
    let nan = FilterOptions {
        contrast: f32::NAN,
        ..FilterOptions::default()
    };
    assert!(nan.validate().is_err());
}

#[test]
fn identity_options_leave_pixels_alone() {
    let p = photo([10, 200, 30, 255]);
    let out = GlobalAdjust.enhance(&p, &FilterOptions::default()).unwrap();
    assert_eq!(out, p);
}

#[test]
fn brightness_scales_channels() {
    let p = photo([100, 50, 200, 255]);
    let opts = FilterOptions {
        brightness: 0.5,
        ..FilterOptions::default()
    };
    let out = GlobalAdjust.enhance(&p, &opts).unwrap();
    assert_eq!(&out.rgba8_premul[..4], &[150, 75, 255, 255]);
}

#[test]
fn contrast_pushes_away_from_mid_gray() {
    let p = photo([64, 128, 192, 255]);
    let opts = FilterOptions {
        contrast: 0.5,
        ..FilterOptions::default()
    };
    let out = GlobalAdjust.enhance(&p, &opts).unwrap();
    let px = &out.rgba8_premul[..4];
    assert!(px[0] < 64);
    assert!((i32::from(px[1]) - 128).abs() <= 1);
    assert!(px[2] > 192);
}

#[test]
fn saturation_keeps_grays_gray() {
    let p = photo([90, 90, 90, 255]);
    let opts = FilterOptions {
        saturation: 1.0,
        ..FilterOptions::default()
    };
    let out = GlobalAdjust.enhance(&p, &opts).unwrap();
    let px = &out.rgba8_premul[..4];
    assert!(px[..3].iter().all(|&c| (i32::from(c) - 90).abs() <= 1));
}

#[test]
fn invalid_options_surface_as_enhancement_failure() {
    let opts = FilterOptions {
        saturation: -1.0,
        ..FilterOptions::default()
    };
    let err = GlobalAdjust.enhance(&photo([1, 2, 3, 255]), &opts).unwrap_err();
    assert!(matches!(err, PhotostripError::Enhancement(_)));
}

#[test]
fn noop_shares_pixels() {
    let p = photo([1, 2, 3, 255]);
    let out = NoopEnhancer.enhance(&p, &FilterOptions::default()).unwrap();
    assert!(Arc::ptr_eq(&p.rgba8_premul, &out.rgba8_premul));
}
