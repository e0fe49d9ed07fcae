//! The per-report event loop tying slot tracking, gestures and output together.

use std::io::Read;

use evdevil::event::Key;

use crate::batch::{self, EventSink, ReportBatcher};
use crate::edge::EdgeZone;
use crate::error::{Error, Result};
use crate::gesture;
use crate::input::{parse_input_event, Axis, Event, EventRecord, Layout, PointerModel, SlotTracker};
use crate::mode::OutputMode;
use crate::region::Rectangle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Waiting for the next source event.
    Idle,
    /// Applying events of the report in progress.
    Accumulating,
    /// Report marker seen; classifying and flushing.
    Reporting,
    /// Source ended. Terminal.
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub mode: OutputMode,
    pub rect: Rectangle,
    pub scale: f64,
    pub batch_capacity: usize,
}

/// Converts touchscreen reports into trackpad or pointer reports.
///
/// `S` receives the main output, `K` the optional side-key reports.
pub struct Engine<S, K> {
    settings: EngineSettings,
    tracker: SlotTracker,
    finger_count: usize,
    side: Option<(EdgeZone, K)>,
    batch: ReportBatcher,
    sink: S,
    state: EngineState,
    reports: u64,
}

impl<S: EventSink, K: EventSink> Engine<S, K> {
    pub fn new(
        settings: EngineSettings,
        model: PointerModel,
        sink: S,
        side: Option<(EdgeZone, K)>,
    ) -> Self {
        Self {
            settings,
            tracker: SlotTracker::new(model),
            finger_count: 0,
            side,
            batch: ReportBatcher::new(settings.batch_capacity),
            sink,
            state: EngineState::Idle,
            reports: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Read and convert events until the source fails or ends.
    pub fn run<R: Read>(&mut self, source: &mut R, layout: Layout) -> Result<()> {
        let mut buf = vec![0u8; layout.size()];

        loop {
            self.state = EngineState::Idle;
            if let Err(e) = source.read_exact(&mut buf) {
                self.state = EngineState::Closed;
                log::debug!(
                    "Source closed after {} reports ({} events dropped)",
                    self.reports,
                    self.batch.dropped()
                );
                return Err(Error::SourceRead(e));
            }

            let Some(record) = parse_input_event(&buf, layout) else {
                continue;
            };
            self.handle(&record);
        }
    }

    /// Feed one decoded source event.
    pub fn handle(&mut self, record: &EventRecord) {
        log::trace!("RECV {:?} @{}", record.event, record.time_us);
        self.state = EngineState::Accumulating;

        if record.event == Event::Report {
            self.state = EngineState::Reporting;
            match self.settings.mode {
                OutputMode::Passthrough => self.report_passthrough(),
                OutputMode::Relative => self.report_relative(),
            }
            log_report_progress(&mut self.reports, self.finger_count);
            self.state = EngineState::Accumulating;
            return;
        }

        self.tracker.apply(record);
        if self.settings.mode == OutputMode::Passthrough {
            self.batch.enqueue(record.event);
        }
    }

    fn report_passthrough(&mut self) {
        let count = self.tracker.active_count();
        if count != self.finger_count {
            let keys = gesture::finger_transition(self.finger_count, count);
            self.batch.enqueue_front(&keys);
            self.finger_count = count;
        }

        if let Some((zone, aux)) = &mut self.side {
            if let Some(pressed) = zone.update(self.batch.events(), count, &self.settings.rect) {
                log::debug!("Side touch {}", if pressed { "started" } else { "ended" });
                batch::write_best_effort(aux, &zone.key_report(pressed));
            }
        }

        rewrite_positions(self.batch.events_mut(), &self.settings.rect);
        self.batch.flush(&mut self.sink, Event::Report);
        self.tracker.commit();
    }

    fn report_relative(&mut self) {
        let motion = gesture::classify_relative(&mut self.tracker, &self.settings.rect);
        self.finger_count = self.tracker.active_count();

        let moves = gesture::scaled_motion(&motion, self.settings.scale);
        if !moves.is_empty() {
            for event in moves {
                self.batch.enqueue(event);
            }
            self.batch.flush(&mut self.sink, Event::Report);
        }

        if motion.click {
            for pressed in [true, false] {
                self.batch.enqueue(Event::key(Key::BTN_LEFT.raw(), pressed));
                self.batch.flush(&mut self.sink, Event::Report);
            }
        }
    }

    #[cfg(test)]
    fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    fn side_sink(&self) -> Option<&K> {
        self.side.as_ref().map(|(_, aux)| aux)
    }
}

/// Rewrite absolute positions into the trackpad's zero-based coordinate space.
fn rewrite_positions(events: &mut [Event], rect: &Rectangle) {
    for event in events {
        if let Event::Position { axis, value, .. } = event {
            let span = match axis {
                Axis::X => rect.x,
                Axis::Y => rect.y,
            };
            *value = span.clamp_and_shift(*value);
        }
    }
}

fn log_report_progress(reports: &mut u64, finger_count: usize) {
    if *reports == 0 {
        log::info!("Touch events flowing");
    }
    *reports += 1;

    if (*reports).is_multiple_of(500) {
        log::debug!("Reports: {}, fingers: {}", reports, finger_count);
    }
}
