//! Photostrip composes photobooth strips.
//!
//! Two pieces do the work:
//!
//! 1. **Capture**: [`CaptureSequencer`] drives countdown-gated acquisition of a fixed number
//!    of photos from a [`FrameSource`] (camera, folder, scripted feed) or from manual uploads.
//! 2. **Compose**: [`Compositor::compose`] turns the finished [`PhotoSet`], a frame graphic,
//!    a [`Layout`] and a [`StyleConfig`] into one premultiplied RGBA8 [`Raster`], which
//!    [`encode_png`] exports.
//!
//! [`BoothSession`] ties both together with debounced, generation-tagged recomposition for
//! live style edits. Time is always passed in explicitly, so every state transition is
//! reproducible in tests.
#![forbid(unsafe_code)]

mod assets;
mod capture;
mod compose;
mod config;
mod enhance;
mod foundation;
mod layout;
mod session;

pub use assets::decode::{FrameGraphic, Photo, decode_frame, decode_photo};
pub use assets::fonts::{FontBook, ResolvedFont};
pub use assets::source::{ImageSource, decode_data_url, encode_data_url, load_frame, load_photo};
pub use capture::countdown::{Countdown, CountdownEvent, MAX_COUNTDOWN_SECONDS};
pub use capture::sequencer::{
    CaptureSequencer, Phase, PhotoOrigin, PhotoSet, SequencerEvent, SequencerTimings,
    SessionState, SlotTicket,
};
pub use capture::source::{DirectorySource, FrameSource, ScriptedFrame, ScriptedSource};
pub use compose::composite::{blit_over, over};
pub use compose::compositor::{
    Compositor, LINE_SPACING_PX, MAX_FONT_SIZE, MIN_FONT_SIZE, Raster, StyleConfig,
    caption_baselines, fit_photo,
};
pub use compose::export::{
    DEFAULT_DOWNLOAD_NAME, encode_png, to_png_data_url, to_straight_rgba8, write_png,
};
pub use compose::text::{CaptionLine, TextBrushRgba8, TextRenderer};
pub use config::{BoothConfig, EnhanceConfig, TimingsConfig};
pub use enhance::filter::{Enhancer, FilterOptions, GlobalAdjust, NoopEnhancer};
pub use enhance::pipeline::{enhance_all, enhance_with_fallback};
pub use enhance::skin::{SkinSmoothing, is_skin_rgb};
pub use foundation::color::{BACKGROUND_PRESETS, ColorPreset, ColorRgba8};
pub use foundation::core::{
    Canvas, PixelRect, Rgba8Premul, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};
pub use foundation::error::{PhotostripError, PhotostripResult};
pub use layout::table::{FrameGeometry, LAYOUTS, Layout, LayoutSpec, MAX_CANVAS_SIDE};
pub use session::booth::{BoothSession, RecomposeJob, RecomposeOutcome};
pub use session::recompose::{Generation, RecomposeQueue, RecomposeRequest};
