//! Consumer side of the feedback channel, plus a controller sink that logs.

use std::io;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;
use tracing::{debug, info, trace};
use vrwheel_engine::{Feedback, MemoryController, VirtualControllerSink};

/// Totals seen by the feedback thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedbackTally {
    pub pulses: u64,
    pub pulse_micros: u64,
    pub gear_changes: u64,
    pub sequential: u64,
    pub limit_hits: u64,
    pub road_feel: u64,
    pub edit_toggles: u64,
}

impl FeedbackTally {
    pub fn record(&mut self, feedback: &Feedback) {
        match *feedback {
            Feedback::HapticPulse { hand, micros } => {
                trace!(%hand, micros, "haptic pulse");
                self.pulses = self.pulses.saturating_add(1);
                self.pulse_micros = self.pulse_micros.saturating_add(u64::from(micros));
            }
            Feedback::GearChanged(change) => {
                debug!(?change, "gear");
                self.gear_changes = self.gear_changes.saturating_add(1);
            }
            Feedback::SequentialShift(direction) => {
                debug!(?direction, "sequential shift");
                self.sequential = self.sequential.saturating_add(1);
            }
            Feedback::WheelLimit => {
                debug!("wheel at rotation limit");
                self.limit_hits = self.limit_hits.saturating_add(1);
            }
            Feedback::RoadFeel { intensity } => {
                trace!(intensity, "road feel");
                self.road_feel = self.road_feel.saturating_add(1);
            }
            Feedback::EditMode { active } => {
                info!(active, "wheel placement");
                self.edit_toggles = self.edit_toggles.saturating_add(1);
            }
        }
    }
}

/// Drain `rx` until every sender is gone.
pub fn spawn_logger(rx: Receiver<Feedback>) -> io::Result<JoinHandle<FeedbackTally>> {
    thread::Builder::new().name("feedback".into()).spawn(move || {
        let mut tally = FeedbackTally::default();
        for feedback in rx.iter() {
            tally.record(&feedback);
        }
        tally
    })
}

/// Keeps the controller state and traces every value that changes.
#[derive(Debug, Default)]
pub struct TracingController {
    inner: MemoryController,
}

impl TracingController {
    pub fn state(&self) -> &MemoryController {
        &self.inner
    }
}

impl VirtualControllerSink for TracingController {
    fn set_axis(&mut self, axis: u8, value: i32) {
        if self.inner.axis(axis) != Some(value) {
            trace!(axis = format_args!("{axis:#04x}"), value, "axis");
        }
        self.inner.set_axis(axis, value);
    }

    fn set_button(&mut self, button: u8, pressed: bool) {
        if self.inner.button(button) != pressed {
            trace!(button, pressed, "button");
        }
        self.inner.set_button(button, pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;
    use vrwheel_engine::{ChannelFeedback, FeedbackSink, Hand, axes};

    #[test]
    fn test_logger_tallies_until_closed() -> Result<(), Box<dyn std::error::Error>> {
        let (tx, rx) = channel::bounded(16);
        let logger = spawn_logger(rx)?;
        let mut sink = ChannelFeedback::new(tx);
        sink.send(Feedback::HapticPulse {
            hand: Hand::Left,
            micros: 250,
        });
        sink.send(Feedback::HapticPulse {
            hand: Hand::Right,
            micros: 3000,
        });
        sink.send(Feedback::WheelLimit);
        sink.send(Feedback::EditMode { active: true });
        drop(sink);
        let tally = logger.join().map_err(|panic| format!("logger panicked: {panic:?}"))?;
        assert_eq!(tally.pulses, 2);
        assert_eq!(tally.pulse_micros, 3250);
        assert_eq!(tally.limit_hits, 1);
        assert_eq!(tally.edit_toggles, 1);
        Ok(())
    }

    #[test]
    fn test_tracing_controller_keeps_state() {
        let mut c = TracingController::default();
        c.set_axis(axes::X, 0x4000);
        c.set_button(7, true);
        c.set_button(7, true);
        assert_eq!(c.state().axis(axes::X), Some(0x4000));
        assert!(c.state().button(7));
    }
}
