//! JSON configuration for a booth session.

use std::{fs::File, io::BufReader, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    assets::source::ImageSource,
    capture::{countdown::MAX_COUNTDOWN_SECONDS, sequencer::SequencerTimings},
    compose::compositor::StyleConfig,
    enhance::filter::FilterOptions,
    foundation::{
        color::ColorRgba8,
        error::{PhotostripError, PhotostripResult},
    },
    layout::table::{FrameGeometry, Layout},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingsConfig {
    pub pre_roll_ms: u64,
    pub inter_shot_ms: u64,
    pub settle_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            pre_roll_ms: 300,
            inter_shot_ms: 800,
            settle_ms: 500,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    pub enabled: bool,
    pub options: FilterOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    pub layout: Layout,
    pub countdown_seconds: u32,
    pub timings: TimingsConfig,
    pub debounce_ms: u64,
    pub style: StyleConfig,
    /// Frame graphic path or data URL; falls back to `style.frame`, then to a plain border.
    pub frame: Option<String>,
    /// Color of the built-in border frame.
    pub border_color: ColorRgba8,
    pub enhance: EnhanceConfig,
    pub geometry: FrameGeometry,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            countdown_seconds: 3,
            timings: TimingsConfig::default(),
            debounce_ms: 150,
            style: StyleConfig::default(),
            frame: None,
            border_color: ColorRgba8::rgb(0x22, 0x22, 0x22),
            enhance: EnhanceConfig::default(),
            geometry: FrameGeometry::default(),
        }
    }
}

impl BoothConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> PhotostripResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PhotostripError::validation(format!("parse booth config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> PhotostripResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PhotostripError::validation(format!("open booth config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> PhotostripResult<()> {
        if !(1..=MAX_COUNTDOWN_SECONDS).contains(&self.countdown_seconds) {
            return Err(PhotostripError::validation(format!(
                "countdown_seconds must be within 1..={MAX_COUNTDOWN_SECONDS}, got {}",
                self.countdown_seconds
            )));
        }
        self.style.validate()?;
        self.geometry.validate()?;
        self.enhance.options.validate()?;
        Ok(())
    }

    pub fn sequencer_timings(&self) -> SequencerTimings {
        SequencerTimings {
            pre_roll: Duration::from_millis(self.timings.pre_roll_ms),
            inter_shot: Duration::from_millis(self.timings.inter_shot_ms),
            settle: Duration::from_millis(self.timings.settle_ms),
            countdown_seconds: self.countdown_seconds,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn frame_source(&self) -> Option<ImageSource> {
        self.frame
            .as_deref()
            .or(self.style.frame.as_deref())
            .filter(|s| !s.trim().is_empty())
            .map(ImageSource::parse)
    }
}
