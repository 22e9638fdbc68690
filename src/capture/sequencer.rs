//! Countdown-gated capture state machine.
//!
//! Every operation takes the current time explicitly; nothing runs in the background.
//! A host loop calls [`CaptureSequencer::poll`] whenever [`CaptureSequencer::next_deadline`]
//! is reached and forwards manual uploads through slot tickets, so at most one photo
//! write is ever in flight.

use std::time::Duration;

use crate::{
    assets::decode::{Photo, decode_photo},
    capture::{
        countdown::{Countdown, CountdownEvent},
        source::FrameSource,
    },
    foundation::error::{PhotostripError, PhotostripResult},
    layout::table::Layout,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    /// Pre-roll or inter-shot pause; a countdown is scheduled.
    AwaitingNextShot,
    CountdownActive,
    /// Collecting photos with nothing scheduled.
    Capturing,
    /// Set is full; settle delay running.
    Complete,
    Previewing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoOrigin {
    Camera,
    Upload,
}

/// Photos in capture order, bounded by the layout's count.
#[derive(Clone, Debug, Default)]
pub struct PhotoSet {
    photos: Vec<Photo>,
    capacity: usize,
}

impl PhotoSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            photos: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= self.capacity
    }

    pub fn as_slice(&self) -> &[Photo] {
        &self.photos
    }

    fn push(&mut self, photo: Photo) -> PhotostripResult<usize> {
        if self.is_full() {
            return Err(PhotostripError::rejected(format!(
                "photo set already holds {} photos",
                self.capacity
            )));
        }
        self.photos.push(photo);
        Ok(self.photos.len() - 1)
    }

    fn remove(&mut self, index: usize) -> PhotostripResult<Photo> {
        if index >= self.photos.len() {
            return Err(PhotostripError::validation(format!(
                "photo index {index} out of range (set holds {})",
                self.photos.len()
            )));
        }
        Ok(self.photos.remove(index))
    }
}

/// Observable session state; only the sequencer transitions it.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub phase: Phase,
    pub layout: Layout,
    pub photos: PhotoSet,
    /// Always `layout.count() - photos.len()`.
    pub remaining: usize,
    /// Bumped by every start, reset and retake.
    pub epoch: u64,
}

impl SessionState {
    fn idle(layout: Layout, epoch: u64) -> Self {
        Self {
            phase: Phase::Idle,
            layout,
            photos: PhotoSet::with_capacity(layout.count()),
            remaining: layout.count(),
            epoch,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequencerTimings {
    pub pre_roll: Duration,
    pub inter_shot: Duration,
    pub settle: Duration,
    pub countdown_seconds: u32,
}

impl Default for SequencerTimings {
    fn default() -> Self {
        Self {
            pre_roll: Duration::from_millis(300),
            inter_shot: Duration::from_millis(800),
            settle: Duration::from_millis(500),
            countdown_seconds: 3,
        }
    }
}

#[derive(Debug)]
pub enum SequencerEvent {
    CountdownStarted { seconds: u32 },
    CountdownTick { remaining: u32 },
    PhotoAdded { index: usize, origin: PhotoOrigin },
    CaptureFailed { error: PhotostripError },
    Complete,
    PreviewReady,
}

/// Exclusive right to write the next photo slot.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a reserved slot blocks captures until fulfilled or released"]
pub struct SlotTicket {
    epoch: u64,
    slot: usize,
}

impl SlotTicket {
    /// Index the photo will occupy.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Debug)]
enum Schedule {
    None,
    Shot { at: Duration },
    Countdown(Countdown),
    /// Countdown finished while an upload held the slot; due as soon as it clears.
    DeferredCapture { since: Duration },
    Settle { at: Duration },
}

#[derive(Debug)]
pub struct CaptureSequencer {
    state: SessionState,
    timings: SequencerTimings,
    schedule: Schedule,
    reserved: Option<u64>,
}

impl CaptureSequencer {
    pub fn new(timings: SequencerTimings) -> PhotostripResult<Self> {
        if timings.countdown_seconds == 0 {
            return Err(PhotostripError::validation(
                "countdown must last at least one second",
            ));
        }
        Ok(Self {
            state: SessionState::idle(Layout::default(), 0),
            timings,
            schedule: Schedule::None,
            reserved: None,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn layout(&self) -> Layout {
        self.state.layout
    }

    pub fn photos(&self) -> &[Photo] {
        self.state.photos.as_slice()
    }

    pub fn remaining(&self) -> usize {
        self.state.remaining
    }

    pub fn timings(&self) -> &SequencerTimings {
        &self.timings
    }

    /// Value currently shown by the countdown, if one is running.
    pub fn countdown_remaining(&self) -> Option<u32> {
        match &self.schedule {
            Schedule::Countdown(cd) => Some(cd.remaining()),
            _ => None,
        }
    }

    pub fn has_reserved_slot(&self) -> bool {
        self.reserved.is_some()
    }

    /// The full set, for composing.
    pub fn completed_photos(&self) -> PhotostripResult<&[Photo]> {
        let expected = self.state.layout.count();
        let actual = self.state.photos.len();
        if actual != expected {
            return Err(PhotostripError::IncompleteSet { expected, actual });
        }
        Ok(self.state.photos.as_slice())
    }

    /// When the host should poll next; `None` while nothing is scheduled.
    pub fn next_deadline(&self) -> Option<Duration> {
        match &self.schedule {
            Schedule::Shot { at } | Schedule::Settle { at } => Some(*at),
            Schedule::Countdown(cd) => cd.next_deadline(),
            Schedule::DeferredCapture { since } => self.reserved.is_none().then_some(*since),
            Schedule::None => None,
        }
    }

    pub fn start_capture(&mut self, layout: Layout, now: Duration) -> PhotostripResult<()> {
        match self.state.phase {
            Phase::Idle | Phase::Capturing | Phase::Previewing => {}
            other => {
                return Err(PhotostripError::rejected(format!(
                    "cannot start a capture while {other:?}"
                )));
            }
        }
        if matches!(self.schedule, Schedule::DeferredCapture { .. }) {
            return Err(PhotostripError::rejected(
                "cannot start a capture while a shot is pending",
            ));
        }
        self.state = SessionState::idle(layout, self.state.epoch + 1);
        self.reserved = None;
        self.schedule = Schedule::Shot {
            at: now + self.timings.pre_roll,
        };
        self.set_phase(Phase::AwaitingNextShot);
        tracing::info!(layout = %layout, count = layout.count(), "capture started");
        Ok(())
    }

    /// Re-arm the countdown after a failed capture or a removal.
    pub fn resume(&mut self, now: Duration) -> PhotostripResult<()> {
        if self.state.phase != Phase::Capturing
            || self.state.remaining == 0
            || !matches!(self.schedule, Schedule::None)
        {
            return Err(PhotostripError::rejected(format!(
                "nothing to resume while {:?}",
                self.state.phase
            )));
        }
        self.schedule = Schedule::Shot {
            at: now + self.timings.pre_roll,
        };
        self.set_phase(Phase::AwaitingNextShot);
        Ok(())
    }

    pub fn poll(&mut self, now: Duration, source: &mut dyn FrameSource) -> Vec<SequencerEvent> {
        let mut events = Vec::new();
        loop {
            match &mut self.schedule {
                Schedule::Shot { at } if now >= *at => {
                    let at = *at;
                    let seconds = self.timings.countdown_seconds;
                    match Countdown::start(seconds, at) {
                        Ok(cd) => {
                            self.schedule = Schedule::Countdown(cd);
                            self.set_phase(Phase::CountdownActive);
                            events.push(SequencerEvent::CountdownStarted { seconds });
                        }
                        Err(error) => {
                            self.schedule = Schedule::None;
                            self.set_phase(Phase::Capturing);
                            events.push(SequencerEvent::CaptureFailed { error });
                            break;
                        }
                    }
                }
                Schedule::Countdown(cd) => {
                    let mut completed = false;
                    for ev in cd.poll(now) {
                        match ev {
                            CountdownEvent::Tick { remaining } => {
                                events.push(SequencerEvent::CountdownTick { remaining });
                            }
                            CountdownEvent::Completed => completed = true,
                        }
                    }
                    if !completed {
                        break;
                    }
                    if self.reserved.is_some() {
                        tracing::debug!("countdown finished during upload, capture deferred");
                        self.schedule = Schedule::DeferredCapture { since: now };
                        self.set_phase(Phase::Capturing);
                        break;
                    }
                    self.capture_one(source, now, &mut events);
                }
                Schedule::DeferredCapture { .. } if self.reserved.is_none() => {
                    self.capture_one(source, now, &mut events);
                }
                Schedule::Settle { at } if now >= *at => {
                    self.schedule = Schedule::None;
                    self.set_phase(Phase::Previewing);
                    events.push(SequencerEvent::PreviewReady);
                    break;
                }
                _ => break,
            }
        }
        events
    }

    pub fn reserve_slot(&mut self) -> PhotostripResult<SlotTicket> {
        match self.state.phase {
            Phase::Idle => return Err(PhotostripError::rejected("no capture session is active")),
            Phase::Complete | Phase::Previewing => {
                return Err(PhotostripError::rejected("photo set is already complete"));
            }
            _ => {}
        }
        if self.state.remaining == 0 {
            return Err(PhotostripError::rejected("photo set is already complete"));
        }
        if self.reserved.is_some() {
            return Err(PhotostripError::rejected("another photo is already being added"));
        }
        self.reserved = Some(self.state.epoch);
        Ok(SlotTicket {
            epoch: self.state.epoch,
            slot: self.state.photos.len(),
        })
    }

    pub fn fulfill(
        &mut self,
        ticket: SlotTicket,
        photo: Photo,
        now: Duration,
    ) -> PhotostripResult<Vec<SequencerEvent>> {
        self.check_ticket(&ticket)?;
        self.reserved = None;
        let mut events = Vec::new();
        self.push_photo(photo, PhotoOrigin::Upload, now, &mut events)?;
        Ok(events)
    }

    /// Give up a reservation without adding a photo.
    pub fn release(&mut self, ticket: SlotTicket) {
        if self.check_ticket(&ticket).is_ok() {
            self.reserved = None;
        }
    }

    pub fn upload(&mut self, photo: Photo, now: Duration) -> PhotostripResult<Vec<SequencerEvent>> {
        let ticket = self.reserve_slot()?;
        self.fulfill(ticket, photo, now)
    }

    /// Decode then upload; a decode failure leaves the session untouched.
    pub fn upload_bytes(
        &mut self,
        bytes: &[u8],
        now: Duration,
    ) -> PhotostripResult<Vec<SequencerEvent>> {
        let ticket = self.reserve_slot()?;
        match decode_photo(bytes) {
            Ok(photo) => self.fulfill(ticket, photo, now),
            Err(e) => {
                self.release(ticket);
                Err(e)
            }
        }
    }

    pub fn remove_photo(&mut self, index: usize, _now: Duration) -> PhotostripResult<Photo> {
        if self.state.phase == Phase::Idle {
            return Err(PhotostripError::rejected("no capture session is active"));
        }
        if self.reserved.is_some() {
            return Err(PhotostripError::rejected(
                "cannot remove a photo while another is being added",
            ));
        }
        let removed = self.state.photos.remove(index)?;
        self.sync_remaining();
        if matches!(self.state.phase, Phase::Complete | Phase::Previewing) {
            self.schedule = Schedule::None;
            self.set_phase(Phase::Capturing);
        }
        tracing::debug!(index, remaining = self.state.remaining, "photo removed");
        Ok(removed)
    }

    pub fn reset(&mut self) {
        self.go_idle("reset");
    }

    pub fn retake(&mut self) {
        self.go_idle("retake");
    }

    fn go_idle(&mut self, why: &'static str) {
        if let Schedule::Countdown(cd) = &mut self.schedule {
            cd.cancel();
        }
        self.schedule = Schedule::None;
        self.reserved = None;
        self.state = SessionState::idle(self.state.layout, self.state.epoch + 1);
        tracing::debug!(why, epoch = self.state.epoch, "session back to idle");
    }

    fn check_ticket(&self, ticket: &SlotTicket) -> PhotostripResult<()> {
        if ticket.epoch != self.state.epoch || self.reserved != Some(ticket.epoch) {
            return Err(PhotostripError::rejected("upload ticket is stale"));
        }
        Ok(())
    }

    fn capture_one(
        &mut self,
        source: &mut dyn FrameSource,
        now: Duration,
        events: &mut Vec<SequencerEvent>,
    ) {
        self.schedule = Schedule::None;
        if self.state.remaining == 0 {
            return;
        }
        self.set_phase(Phase::Capturing);
        let shot = source.capture().and_then(|bytes| decode_photo(&bytes));
        match shot {
            Ok(photo) => {
                if let Err(error) = self.push_photo(photo, PhotoOrigin::Camera, now, events) {
                    events.push(SequencerEvent::CaptureFailed { error });
                }
            }
            Err(error) => {
                tracing::warn!(source = %source.describe(), error = %error, "capture failed");
                events.push(SequencerEvent::CaptureFailed { error });
            }
        }
    }

    fn push_photo(
        &mut self,
        photo: Photo,
        origin: PhotoOrigin,
        now: Duration,
        events: &mut Vec<SequencerEvent>,
    ) -> PhotostripResult<()> {
        let index = self.state.photos.push(photo)?;
        self.sync_remaining();
        events.push(SequencerEvent::PhotoAdded { index, origin });

        if self.state.remaining == 0 {
            if let Schedule::Countdown(cd) = &mut self.schedule {
                cd.cancel();
            }
            self.schedule = Schedule::Settle {
                at: now + self.timings.settle,
            };
            self.set_phase(Phase::Complete);
            events.push(SequencerEvent::Complete);
        } else if origin == PhotoOrigin::Camera {
            self.schedule = Schedule::Shot {
                at: now + self.timings.inter_shot,
            };
            self.set_phase(Phase::AwaitingNextShot);
        }
        Ok(())
    }

    fn sync_remaining(&mut self) {
        self.state.remaining = self.state.layout.count() - self.state.photos.len();
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase != phase {
            tracing::debug!(from = ?self.state.phase, to = ?phase, "sequencer phase");
            self.state.phase = phase;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/sequencer.rs"]
mod tests;
