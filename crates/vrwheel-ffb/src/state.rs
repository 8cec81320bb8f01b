//! Feedback state shared between the driver callback and the frame loop.
//!
//! [`FfbState`] is the single owner of the effect table, the device gain
//! and the synthesis history. [`FfbHandle`] wraps it in one mutex; the
//! callback applies reports under the lock and the frame loop synthesizes
//! under the same lock, so it never observes a half-applied report.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};
use vrwheel_errors::DecodeResult;

use crate::counters::{CounterSnapshot, FfbCounters};
use crate::effects::EffectPayload;
use crate::report::{DeviceControl, DeviceGain, FfbReport, decode_packet};
use crate::synth::{FfbFrame, MagnitudeSynth, SynthConfig};
use crate::table::EffectTable;

/// Read-only view for diagnostics and rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FfbSnapshot {
    pub active_effects: usize,
    pub gain: f64,
    pub paused: bool,
    pub actuators_enabled: bool,
    pub smoothed: f64,
}

#[derive(Debug, Clone)]
pub struct FfbState {
    table: EffectTable,
    gain: DeviceGain,
    synth: MagnitudeSynth,
}

impl Default for FfbState {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}

impl FfbState {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            table: EffectTable::new(),
            gain: DeviceGain::FULL,
            synth: MagnitudeSynth::new(config),
        }
    }

    pub fn table(&self) -> &EffectTable {
        &self.table
    }

    pub fn gain(&self) -> DeviceGain {
        self.gain
    }

    pub fn apply(&mut self, report: &FfbReport, now: Instant) {
        match *report {
            FfbReport::Effect { ebi, params } => self.table.set_params(ebi, params),
            FfbReport::Periodic { ebi, periodic } => {
                self.table.set_payload(ebi, EffectPayload::Periodic(periodic));
            }
            FfbReport::Constant { ebi, magnitude } => {
                self.table.set_payload(ebi, EffectPayload::Constant(magnitude));
            }
            FfbReport::Ramp { ebi, ramp } => self.table.set_payload(ebi, EffectPayload::Ramp(ramp)),
            FfbReport::Operation {
                ebi,
                op,
                loop_count,
            } => self.table.operate(ebi, op, loop_count, now),
            FfbReport::BlockFree { ebi } => self.table.free(ebi),
            FfbReport::DeviceControl(control) => {
                self.table.control(control, now);
                if matches!(control, DeviceControl::StopAll | DeviceControl::Reset) {
                    self.synth.reset();
                }
            }
            FfbReport::Gain(gain) => {
                self.gain = gain;
                debug!(gain = gain.raw(), "ffb device gain");
            }
            FfbReport::NewEffect(kind) => trace!(?kind, "ffb new effect requested"),
        }
    }

    /// One output-frame synthesis step.
    pub fn synthesize(&mut self, now: Instant) -> FfbFrame {
        self.table.expire(now);
        let raw = self.table.raw_sum(now) * self.gain.coefficient();
        self.synth.push(raw, now)
    }

    pub fn snapshot(&self) -> FfbSnapshot {
        FfbSnapshot {
            active_effects: self.table.len(),
            gain: self.gain.coefficient(),
            paused: self.table.is_paused(),
            actuators_enabled: self.table.actuators_enabled(),
            smoothed: self.synth.smoothed(),
        }
    }

    pub fn history(&self) -> Vec<f64> {
        self.synth.history().collect()
    }
}

/// Cloneable handle to the shared feedback state.
///
/// # Example
///
/// ```rust
/// use std::time::Instant;
/// use vrwheel_ffb::FfbHandle;
///
/// let ffb = FfbHandle::default();
/// let now = Instant::now();
/// // gain 255, start EBI 1, constant 5000
/// for packet in [
///     vec![10, 0, 0, 0, 0x0F, 0, 0x0B, 0, 0x1D, 0xFF],
///     vec![12, 0, 0, 0, 0x0F, 0, 0x0B, 0, 0x1A, 1, 1, 0],
///     vec![12, 0, 0, 0, 0x0F, 0, 0x0B, 0, 0x15, 1, 0x88, 0x13],
/// ] {
///     ffb.handle_packet(&packet, now);
/// }
/// let frame = ffb.synthesize(now);
/// assert!((frame.raw - 0.5).abs() < 1e-9);
/// assert_eq!(ffb.counters().applied, 3);
/// ```
#[derive(Debug, Clone)]
pub struct FfbHandle {
    state: Arc<Mutex<FfbState>>,
    counters: Arc<FfbCounters>,
}

impl Default for FfbHandle {
    fn default() -> Self {
        Self::new(SynthConfig::default())
    }
}

impl FfbHandle {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(FfbState::new(config))),
            counters: Arc::new(FfbCounters::new()),
        }
    }

    /// Decode and apply one driver packet. Never fails; undecodable
    /// packets are counted and dropped.
    pub fn handle_packet(&self, packet: &[u8], now: Instant) {
        self.counters.inc_packet();
        if let Err(err) = self.try_handle_packet(packet, now) {
            trace!(code = err.code(), %err, "ffb packet dropped");
            self.counters.record_error(err);
        }
    }

    /// Like [`handle_packet`](Self::handle_packet) but reports why a packet
    /// was dropped.
    ///
    /// # Errors
    ///
    /// Returns the decode error; the shared state is untouched in that case.
    pub fn try_handle_packet(&self, packet: &[u8], now: Instant) -> DecodeResult<()> {
        let decoded = decode_packet(packet)?;
        self.apply(&decoded.report, now);
        Ok(())
    }

    pub fn apply(&self, report: &FfbReport, now: Instant) {
        self.state.lock().apply(report, now);
        self.counters.inc_applied();
    }

    pub fn synthesize(&self, now: Instant) -> FfbFrame {
        let frame = self.state.lock().synthesize(now);
        if frame.haptic.is_some() {
            self.counters.inc_haptic();
        }
        frame
    }

    pub fn snapshot(&self) -> FfbSnapshot {
        self.state.lock().snapshot()
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }
}
