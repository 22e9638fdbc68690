use super::*;

#[test]
fn table_rows_match_published_contract() {
    let rows: Vec<_> = LAYOUTS
        .iter()
        .map(|s| (s.name, s.count, s.cols, s.rows))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2pose", 2, 1, 2),
            ("3pose", 3, 1, 3),
            ("4pose", 4, 2, 2),
            ("6pose", 6, 2, 3),
        ]
    );
    for s in &LAYOUTS {
        assert_eq!(s.layout.spec(), s);
        assert_eq!(s.count as u32, s.cols * s.rows);
    }
}

#[test]
fn names_parse_and_unknown_is_rejected() {
    assert_eq!(Layout::from_name("4pose").unwrap(), Layout::FourPose);
    assert_eq!("6POSE".parse::<Layout>().unwrap(), Layout::SixPose);
    assert!(Layout::from_name("5pose").is_err());
}

#[test]
fn serde_uses_pose_names() {
    let v = serde_json::to_value(Layout::ThreePose).unwrap();
    assert_eq!(v, serde_json::json!("3pose"));
    let back: Layout = serde_json::from_value(serde_json::json!("2pose")).unwrap();
    assert_eq!(back, Layout::TwoPose);
}

#[test]
fn canvas_sizes_for_every_layout() {
    let g = FrameGeometry::default();
    let sizes: Vec<_> = Layout::all()
        .map(|l| {
            let c = g.canvas_for(l);
            (c.width, c.height)
        })
        .collect();
    assert_eq!(
        sizes,
        vec![(780, 1260), (780, 1820), (1500, 1260), (1500, 1820)]
    );
}

#[test]
fn cells_fill_row_major_with_gap() {
    let g = FrameGeometry::default();
    assert_eq!(
        g.cell_rect(Layout::FourPose, 0),
        PixelRect::new(40, 40, 700, 540)
    );
    assert_eq!(
        g.cell_rect(Layout::FourPose, 1),
        PixelRect::new(760, 40, 700, 540)
    );
    assert_eq!(
        g.cell_rect(Layout::FourPose, 2),
        PixelRect::new(40, 600, 700, 540)
    );
    assert_eq!(
        g.window_rect(Layout::ThreePose, 2),
        PixelRect::new(70, 1250, 640, 360)
    );
}

#[test]
fn geometry_validation_rejects_window_outside_frame() {
    let g = FrameGeometry {
        window_x: 100,
        ..FrameGeometry::default()
    };
    assert!(g.validate().is_err());
    assert!(FrameGeometry::default().validate().is_ok());
}

#[test]
fn geometry_validation_rejects_overflowing_values() {
    let window = FrameGeometry {
        window_x: u32::MAX,
        window_width: 2,
        ..FrameGeometry::default()
    };
    assert!(matches!(window.validate(), Err(PhotostripError::Validation(_))));

    let huge_frame = FrameGeometry {
        frame_width: u32::MAX / 2,
        ..FrameGeometry::default()
    };
    assert!(matches!(huge_frame.validate(), Err(PhotostripError::Validation(_))));

    let huge_gap = FrameGeometry {
        gap: u32::MAX,
        ..FrameGeometry::default()
    };
    assert!(matches!(huge_gap.validate(), Err(PhotostripError::Validation(_))));
}

#[test]
fn geometry_validation_caps_canvas_size() {
    // 6pose is three frames tall: 3*5400 + 2*20 + 2*40 + 80 > MAX_CANVAS_SIDE.
    let tall = FrameGeometry {
        frame_height: 5_400,
        ..FrameGeometry::default()
    };
    assert!(tall.validate().is_err());

    let fits = FrameGeometry {
        frame_height: 5_000,
        ..FrameGeometry::default()
    };
    assert!(fits.validate().is_ok());
    assert!(fits.canvas_for(Layout::SixPose).height <= MAX_CANVAS_SIDE);
}

#[test]
fn canvas_for_saturates_on_unvalidated_geometry() {
    let g = FrameGeometry {
        margin: u32::MAX,
        ..FrameGeometry::default()
    };
    assert_eq!(g.canvas_for(Layout::TwoPose).width, u32::MAX);
}
