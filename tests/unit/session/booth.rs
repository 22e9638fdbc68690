use std::io::Cursor;

use super::*;
use crate::{
    assets::fonts::FontBook,
    capture::{sequencer::SequencerTimings, source::ScriptedSource},
    compose::text::TextRenderer,
    foundation::color::ColorRgba8,
    layout::table::FrameGeometry,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn geometry() -> FrameGeometry {
    FrameGeometry {
        frame_width: 40,
        frame_height: 30,
        window_x: 4,
        window_y: 4,
        window_width: 32,
        window_height: 20,
        margin: 4,
        gap: 2,
        caption_band: 10,
    }
}

fn png_bytes(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(16, 10, image::Rgba([shade, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn session() -> BoothSession {
    let compositor =
        Compositor::with_text_renderer(geometry(), TextRenderer::new(FontBook::empty())).unwrap();
    let frame = FrameGraphic::plain_border(&geometry(), ColorRgba8::rgb(0, 0, 0));
    BoothSession::new(
        CaptureSequencer::new(SequencerTimings::default()).unwrap(),
        compositor,
        frame,
        StyleConfig::default(),
        ms(150),
    )
    .unwrap()
}

fn camera(n: usize) -> ScriptedSource {
    let mut src = ScriptedSource::default();
    for i in 0..n {
        src.push_frame(png_bytes(100 + i as u8));
    }
    src
}

/// Poll the session at each deadline until it settles; returns the last poll time.
fn drive(s: &mut BoothSession, src: &mut ScriptedSource) -> Duration {
    let mut now = Duration::ZERO;
    for _ in 0..200 {
        let Some(at) = s.next_deadline() else { break };
        now = at;
        s.poll(now, src);
        s.recompose_due(now).unwrap();
    }
    now
}

#[test]
fn entering_preview_produces_a_composite() {
    let mut s = session();
    let mut src = camera(2);
    s.start_capture(Layout::TwoPose, ms(0)).unwrap();
    drive(&mut s, &mut src);

    assert_eq!(s.phase(), Phase::Previewing);
    let raster = s.composite().unwrap();
    assert_eq!(raster.size(), geometry().canvas_for(Layout::TwoPose));
    let png = s.export_png().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    assert!(s.export_data_url().unwrap().starts_with("data:image/png;base64,"));
}

#[test]
fn style_edits_are_debounced_then_applied() {
    let mut s = session();
    let mut src = camera(2);
    s.start_capture(Layout::TwoPose, ms(0)).unwrap();
    let t = drive(&mut s, &mut src);
    assert_eq!(s.composite().unwrap().pixel(0, 0), [255, 255, 255, 255]);

    let black = StyleConfig {
        background: ColorRgba8::rgb(0x22, 0x22, 0x22),
        ..StyleConfig::default()
    };
    s.set_style(black.clone(), t).unwrap();
    assert!(!s.recompose_due(t + ms(100)).unwrap());
    assert_eq!(s.composite().unwrap().pixel(0, 0), [255, 255, 255, 255]);
    assert!(s.recompose_due(t + ms(150)).unwrap());
    assert_eq!(s.composite().unwrap().pixel(0, 0), [0x22, 0x22, 0x22, 255]);
    assert_eq!(s.style(), &black);
}

#[test]
fn superseded_job_result_is_discarded() {
    let mut s = session();
    let mut src = camera(2);
    s.start_capture(Layout::TwoPose, ms(0)).unwrap();
    let t = drive(&mut s, &mut src);
    let before = s.composite().cloned();

    s.set_style(StyleConfig::default(), t).unwrap();
    let job = s.begin_recompose(t + ms(150)).unwrap();
    s.set_style(StyleConfig::default(), t + ms(160)).unwrap();

    let outcome = job.run(s.compositor_mut());
    assert!(!s.apply(outcome).unwrap());
    assert_eq!(s.composite().cloned(), before);
}

#[test]
fn retake_invalidates_in_flight_composite() {
    let mut s = session();
    let mut src = camera(2);
    s.start_capture(Layout::TwoPose, ms(0)).unwrap();
    let t = drive(&mut s, &mut src);

    s.set_style(StyleConfig::default(), t).unwrap();
    let job = s.begin_recompose(t + ms(150)).unwrap();
    s.retake();
    let outcome = job.run(s.compositor_mut());
    assert!(!s.apply(outcome).unwrap());
    assert!(s.composite().is_none());
    assert_eq!(s.phase(), Phase::Idle);
    assert!(matches!(
        s.export_png(),
        Err(PhotostripError::IncompleteSet { .. })
    ));
}

#[test]
fn removing_a_photo_drops_the_composite() {
    let mut s = session();
    let mut src = camera(2);
    s.start_capture(Layout::TwoPose, ms(0)).unwrap();
    let t = drive(&mut s, &mut src);
    s.remove_photo(0, t).unwrap();

    assert!(s.composite().is_none());
    assert_eq!(s.phase(), Phase::Capturing);
    assert!(matches!(
        s.export_png(),
        Err(PhotostripError::IncompleteSet {
            expected: 2,
            actual: 1
        })
    ));
    assert!(s.begin_recompose(t + ms(1_000)).is_none());
}

#[test]
fn style_edits_before_preview_do_not_queue_work() {
    let mut s = session();
    s.start_capture(Layout::TwoPose, ms(0)).unwrap();
    s.set_style(StyleConfig::default(), ms(10)).unwrap();
    assert_eq!(s.next_deadline(), Some(ms(300)));
}

#[test]
fn invalid_style_is_rejected_and_not_stored() {
    let mut s = session();
    let bad = StyleConfig {
        font_size: 4.0,
        ..StyleConfig::default()
    };
    assert!(s.set_style(bad, ms(0)).is_err());
    assert_eq!(s.style().font_size, 28.0);
}

#[test]
fn enhancer_runs_before_compositing() {
    use crate::enhance::filter::GlobalAdjust;

    let mut s = session();
    s.set_enhancer(
        Arc::new(GlobalAdjust),
        FilterOptions {
            brightness: 1.0,
            ..FilterOptions::default()
        },
    )
    .unwrap();
    let mut src = camera(2);
    s.start_capture(Layout::TwoPose, ms(0)).unwrap();
    drive(&mut s, &mut src);

    let g = geometry();
    let window = g.window_rect(Layout::TwoPose, 0);
    let center = s.composite().unwrap().pixel(
        (window.x + i64::from(window.width) / 2) as u32,
        (window.y + i64::from(window.height) / 2) as u32,
    );
    assert_eq!(center, [200, 0, 0, 255]);
}
