//! Effect block table keyed by effect block index.
//!
//! A slot holds whatever parameters the host has sent for an index. It is
//! *active* (part of the effect table proper) only between a START/SOLO and
//! the matching STOP, expiry, block free or device reset.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::effects::{EffectParams, EffectPayload, effect_magnitude};
use crate::report::{DeviceControl, EffectOperation};

/// Lifecycle of a running effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectRun {
    pub started: Instant,
    pub loop_count: u8,
    /// Ordering key among solo effects; the newest solo wins.
    pub solo: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectSlot {
    pub params: Option<EffectParams>,
    pub payload: Option<EffectPayload>,
    pub run: Option<EffectRun>,
}

impl EffectSlot {
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// Own magnitude times own gain, at `now`.
    fn contribution(&self, now: Instant) -> f64 {
        let Some(run) = self.run else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(run.started);
        let gain = self.params.map_or(1.0, |p| p.gain_coefficient());
        effect_magnitude(self.params.as_ref(), self.payload.as_ref(), elapsed) * gain
    }

    /// Total play time, when bounded.
    fn play_time(&self) -> Option<Duration> {
        let run = self.run?;
        if run.loop_count == 0 {
            return None;
        }
        let duration = self.params?.duration()?;
        duration.checked_mul(u32::from(run.loop_count))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectTable {
    slots: BTreeMap<u8, EffectSlot>,
    solo_seq: u64,
    paused_at: Option<Instant>,
    actuators_enabled: bool,
}

impl Default for EffectTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectTable {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            solo_seq: 0,
            paused_at: None,
            actuators_enabled: true,
        }
    }

    /// Number of active effects.
    pub fn len(&self) -> usize {
        self.slots.values().filter(|s| s.is_active()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slot(&self, ebi: u8) -> Option<&EffectSlot> {
        self.slots.get(&ebi)
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn actuators_enabled(&self) -> bool {
        self.actuators_enabled
    }

    /// Merge effect parameters without touching the lifecycle.
    pub fn set_params(&mut self, ebi: u8, params: EffectParams) {
        self.slots.entry(ebi).or_default().params = Some(params);
    }

    pub fn set_payload(&mut self, ebi: u8, payload: EffectPayload) {
        self.slots.entry(ebi).or_default().payload = Some(payload);
    }

    pub fn operate(&mut self, ebi: u8, op: EffectOperation, loop_count: u8, now: Instant) {
        match op {
            EffectOperation::Start | EffectOperation::Solo => {
                let solo = if op == EffectOperation::Solo {
                    self.solo_seq = self.solo_seq.wrapping_add(1);
                    Some(self.solo_seq)
                } else {
                    None
                };
                let slot = self.slots.entry(ebi).or_default();
                slot.run = Some(EffectRun {
                    started: now,
                    loop_count,
                    solo,
                });
                debug!(ebi, ?op, loop_count, "ffb effect started");
            }
            EffectOperation::Stop => {
                if let Some(slot) = self.slots.get_mut(&ebi) {
                    slot.run = None;
                }
                debug!(ebi, "ffb effect stopped");
            }
        }
    }

    /// Forget an effect block entirely.
    pub fn free(&mut self, ebi: u8) {
        self.slots.remove(&ebi);
        trace!(ebi, "ffb effect block freed");
    }

    pub fn control(&mut self, control: DeviceControl, now: Instant) {
        match control {
            DeviceControl::EnableActuators => self.actuators_enabled = true,
            DeviceControl::DisableActuators => self.actuators_enabled = false,
            DeviceControl::StopAll | DeviceControl::Reset => {
                self.slots.clear();
                self.solo_seq = 0;
                self.paused_at = None;
            }
            DeviceControl::Pause => {
                if self.paused_at.is_none() {
                    self.paused_at = Some(now);
                }
            }
            DeviceControl::Continue => {
                if let Some(paused_at) = self.paused_at.take() {
                    let paused_for = now.saturating_duration_since(paused_at);
                    for run in self.slots.values_mut().filter_map(|s| s.run.as_mut()) {
                        run.started = run.started.checked_add(paused_for).unwrap_or(run.started);
                    }
                }
            }
        }
        debug!(?control, "ffb device control");
    }

    /// Stop effects whose bounded play time has elapsed.
    pub fn expire(&mut self, now: Instant) {
        if self.paused_at.is_some() {
            return;
        }
        for (ebi, slot) in &mut self.slots {
            let (Some(run), Some(play)) = (slot.run, slot.play_time()) else {
                continue;
            };
            if now.saturating_duration_since(run.started) > play {
                slot.run = None;
                debug!(ebi = *ebi, "ffb effect expired");
            }
        }
    }

    /// Sum of active contributions, or the newest solo effect alone.
    /// Zero while paused or with actuators disabled.
    pub fn raw_sum(&self, now: Instant) -> f64 {
        if self.paused_at.is_some() || !self.actuators_enabled {
            return 0.0;
        }
        let solo = self
            .slots
            .values()
            .filter_map(|s| s.run.and_then(|r| r.solo).map(|seq| (seq, s)))
            .max_by_key(|(seq, _)| *seq);
        if let Some((_, slot)) = solo {
            return slot.contribution(now);
        }
        self.slots.values().map(|s| s.contribution(now)).sum()
    }
}
