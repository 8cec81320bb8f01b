//! Force feedback report decoding and magnitude synthesis.
//!
//! The host game drives a virtual joystick's force-feedback channel with
//! typed binary reports. This crate decodes them into [`FfbReport`] values,
//! keeps an [`EffectTable`] keyed by effect block index, and once per output
//! frame folds the active effects into a single smoothed centering
//! magnitude plus an optional road-feel haptic trigger.
//!
//! The driver calls back on its own thread; share state through
//! [`FfbHandle`], which guards everything with one mutex.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod constants;
pub mod counters;
pub mod effects;
pub mod reader;
pub mod report;
pub mod state;
pub mod synth;
pub mod table;

pub use counters::{CounterSnapshot, FfbCounters};
pub use effects::*;
pub use reader::ReportReader;
pub use report::*;
pub use state::{FfbHandle, FfbSnapshot, FfbState};
pub use synth::{FfbFrame, MagnitudeSynth, SynthConfig};
pub use table::{EffectRun, EffectSlot, EffectTable};
