use std::{sync::Arc, time::Duration};

use crate::{
    assets::{
        decode::{FrameGraphic, Photo},
        source::load_frame,
    },
    capture::{
        sequencer::{CaptureSequencer, Phase, SequencerEvent, SlotTicket},
        source::FrameSource,
    },
    compose::{
        compositor::{Compositor, Raster, StyleConfig},
        export,
    },
    config::BoothConfig,
    enhance::{
        filter::{Enhancer, FilterOptions},
        pipeline::enhance_all,
        skin::SkinSmoothing,
    },
    foundation::error::{PhotostripError, PhotostripResult},
    layout::table::Layout,
    session::recompose::{Generation, RecomposeQueue},
};

/// Everything a composite needs, detached from the session so it can run elsewhere.
pub struct RecomposeJob {
    generation: Generation,
    photos: Vec<Photo>,
    frame: Arc<FrameGraphic>,
    layout: Layout,
    style: StyleConfig,
    enhancer: Option<(Arc<dyn Enhancer>, FilterOptions)>,
}

impl RecomposeJob {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn run(self, compositor: &mut Compositor) -> RecomposeOutcome {
        let photos = match &self.enhancer {
            Some((enhancer, options)) => enhance_all(enhancer.as_ref(), &self.photos, options),
            None => self.photos,
        };
        let result = compositor.compose(&photos, &self.frame, self.layout, &self.style);
        RecomposeOutcome {
            generation: self.generation,
            result,
        }
    }
}

#[derive(Debug)]
pub struct RecomposeOutcome {
    pub generation: Generation,
    pub result: PhotostripResult<Raster>,
}

/// A capture session together with its live-styled composite.
pub struct BoothSession {
    sequencer: CaptureSequencer,
    style: StyleConfig,
    frame: Arc<FrameGraphic>,
    compositor: Compositor,
    enhancer: Option<(Arc<dyn Enhancer>, FilterOptions)>,
    queue: RecomposeQueue,
    composite: Option<Raster>,
}

impl BoothSession {
    pub fn new(
        sequencer: CaptureSequencer,
        compositor: Compositor,
        frame: FrameGraphic,
        style: StyleConfig,
        debounce: Duration,
    ) -> PhotostripResult<Self> {
        style.validate()?;
        let frame = frame.fit_to(compositor.geometry())?;
        Ok(Self {
            sequencer,
            style,
            frame: Arc::new(frame),
            compositor,
            enhancer: None,
            queue: RecomposeQueue::new(debounce),
            composite: None,
        })
    }

    /// Build a session from configuration, loading the frame graphic if one is named.
    pub fn from_config(config: &BoothConfig, compositor: Compositor) -> PhotostripResult<Self> {
        config.validate()?;
        let frame = match config.frame_source() {
            Some(src) => load_frame(&src, compositor.geometry())?,
            None => FrameGraphic::plain_border(compositor.geometry(), config.border_color),
        };
        let sequencer = CaptureSequencer::new(config.sequencer_timings())?;
        let mut session = Self::new(
            sequencer,
            compositor,
            frame,
            config.style.clone(),
            config.debounce(),
        )?;
        if config.enhance.enabled {
            session.set_enhancer(Arc::new(SkinSmoothing::default()), config.enhance.options)?;
        }
        Ok(session)
    }

    pub fn set_enhancer(
        &mut self,
        enhancer: Arc<dyn Enhancer>,
        options: FilterOptions,
    ) -> PhotostripResult<()> {
        options.validate()?;
        self.enhancer = Some((enhancer, options));
        Ok(())
    }

    pub fn clear_enhancer(&mut self) {
        self.enhancer = None;
    }

    pub fn sequencer(&self) -> &CaptureSequencer {
        &self.sequencer
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn composite(&self) -> Option<&Raster> {
        self.composite.as_ref()
    }

    pub fn start_capture(&mut self, layout: Layout, now: Duration) -> PhotostripResult<()> {
        self.sequencer.start_capture(layout, now)?;
        self.discard_composite();
        Ok(())
    }

    pub fn resume(&mut self, now: Duration) -> PhotostripResult<()> {
        self.sequencer.resume(now)
    }

    /// Advance the sequencer; entering preview queues an immediate composite.
    pub fn poll(&mut self, now: Duration, source: &mut dyn FrameSource) -> Vec<SequencerEvent> {
        let events = self.sequencer.poll(now, source);
        if events
            .iter()
            .any(|e| matches!(e, SequencerEvent::PreviewReady))
        {
            self.queue.request_now(self.style.clone(), now);
        }
        events
    }

    pub fn reserve_slot(&mut self) -> PhotostripResult<SlotTicket> {
        self.sequencer.reserve_slot()
    }

    pub fn fulfill(
        &mut self,
        ticket: SlotTicket,
        photo: Photo,
        now: Duration,
    ) -> PhotostripResult<Vec<SequencerEvent>> {
        self.sequencer.fulfill(ticket, photo, now)
    }

    pub fn release(&mut self, ticket: SlotTicket) {
        self.sequencer.release(ticket);
    }

    pub fn upload(&mut self, photo: Photo, now: Duration) -> PhotostripResult<Vec<SequencerEvent>> {
        self.sequencer.upload(photo, now)
    }

    pub fn remove_photo(&mut self, index: usize, now: Duration) -> PhotostripResult<Photo> {
        let removed = self.sequencer.remove_photo(index, now)?;
        self.discard_composite();
        Ok(removed)
    }

    /// Replace the style; while previewing this schedules a debounced recompose.
    pub fn set_style(&mut self, style: StyleConfig, now: Duration) -> PhotostripResult<()> {
        style.validate()?;
        self.style = style;
        if self.sequencer.phase() == Phase::Previewing {
            self.queue.request(self.style.clone(), now);
        }
        Ok(())
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.sequencer.next_deadline(), self.queue.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Hand out the due recompose request as a self-contained job.
    pub fn begin_recompose(&mut self, now: Duration) -> Option<RecomposeJob> {
        if self.sequencer.phase() != Phase::Previewing {
            return None;
        }
        let request = self.queue.take_due(now)?;
        let photos = match self.sequencer.completed_photos() {
            Ok(photos) => photos.to_vec(),
            Err(err) => {
                tracing::warn!(error = %err, "recompose skipped");
                return None;
            }
        };
        Some(RecomposeJob {
            generation: request.generation,
            photos,
            frame: Arc::clone(&self.frame),
            layout: self.sequencer.layout(),
            style: request.style,
            enhancer: self.enhancer.clone(),
        })
    }

    /// Install a finished composite; stale generations are dropped and `Ok(false)` returned.
    pub fn apply(&mut self, outcome: RecomposeOutcome) -> PhotostripResult<bool> {
        if !self.queue.is_current(outcome.generation)
            || self.sequencer.phase() != Phase::Previewing
        {
            tracing::warn!(
                generation = outcome.generation.get(),
                "discarding stale composite"
            );
            return Ok(false);
        }
        self.composite = Some(outcome.result?);
        Ok(true)
    }

    /// Run a due recompose in place; returns whether a new composite was installed.
    pub fn recompose_due(&mut self, now: Duration) -> PhotostripResult<bool> {
        let Some(job) = self.begin_recompose(now) else {
            return Ok(false);
        };
        let outcome = job.run(&mut self.compositor);
        self.apply(outcome)
    }

    pub fn export_png(&self) -> PhotostripResult<Vec<u8>> {
        export::encode_png(self.ready_composite()?)
    }

    pub fn export_data_url(&self) -> PhotostripResult<String> {
        export::to_png_data_url(self.ready_composite()?)
    }

    pub fn retake(&mut self) {
        self.sequencer.retake();
        self.discard_composite();
    }

    pub fn reset(&mut self) {
        self.sequencer.reset();
        self.discard_composite();
    }

    fn ready_composite(&self) -> PhotostripResult<&Raster> {
        self.sequencer.completed_photos()?;
        self.composite
            .as_ref()
            .ok_or_else(|| PhotostripError::rejected("composite is not ready yet"))
    }

    fn discard_composite(&mut self) {
        self.queue.invalidate();
        self.composite = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/booth.rs"]
mod tests;
