//! Wire constants of the virtual joystick feedback channel and synthesis
//! tuning.

use std::time::Duration;

/// `[size: u32][cmd: u32]` precedes every payload.
pub const HEADER_LEN: usize = 8;

/// Command code for output reports.
pub const CMD_WRITE_REPORT: u32 = 0x000B_000F;
/// Command code for feature reports; their type gains [`FEATURE_TYPE_OFFSET`].
pub const CMD_SET_FEATURE: u32 = 0x000B_0191;
pub const FEATURE_TYPE_OFFSET: u8 = 0x10;

/// Report types
pub const PT_EFFREP: u8 = 0x01;
pub const PT_ENVREP: u8 = 0x02;
pub const PT_CONDREP: u8 = 0x03;
pub const PT_PRIDREP: u8 = 0x04;
pub const PT_CONSTREP: u8 = 0x05;
pub const PT_RAMPREP: u8 = 0x06;
pub const PT_CSTMREP: u8 = 0x07;
pub const PT_SMPLREP: u8 = 0x08;
pub const PT_EFOPREP: u8 = 0x0A;
pub const PT_BLKFRREP: u8 = 0x0B;
pub const PT_CTRLREP: u8 = 0x0C;
pub const PT_GAINREP: u8 = 0x0D;
pub const PT_SETCREP: u8 = 0x0E;
pub const PT_NEWEFREP: u8 = PT_EFFREP + FEATURE_TYPE_OFFSET;
pub const PT_BLKLDREP: u8 = 0x02 + FEATURE_TYPE_OFFSET;
pub const PT_POOLREP: u8 = 0x03 + FEATURE_TYPE_OFFSET;

/// Effect operations
pub const EFF_START: u8 = 1;
pub const EFF_SOLO: u8 = 2;
pub const EFF_STOP: u8 = 3;

/// Device control values
pub const CTRL_ENACT: u8 = 1;
pub const CTRL_DISACT: u8 = 2;
pub const CTRL_STOPALL: u8 = 3;
pub const CTRL_DEVRST: u8 = 4;
pub const CTRL_DEVPAUSE: u8 = 5;
pub const CTRL_DEVCONT: u8 = 6;

/// Duration sentinel for effects that never end on their own.
pub const DURATION_INFINITE: u16 = 0xFFFF;

/// Raw signed magnitudes are scaled by this to land near `[-1, 1]`.
pub const MAGNITUDE_SCALE: f64 = 10_000.0;

pub const MAX_GAIN: u8 = 255;

/// Exponential smoothing weight of the newest raw sample.
pub const SMOOTHING_ALPHA: f64 = 0.3;

/// Samples kept for the centering and haptic paths.
pub const HISTORY_LEN: usize = 10;

/// RMS of consecutive smoothed differences below this never triggers haptics.
pub const HAPTIC_MIN_RMS: f64 = 0.01;

/// Minimum spacing between two haptic triggers.
pub const HAPTIC_COOLDOWN: Duration = Duration::from_millis(100);

/// Haptic intensity is `rms * HAPTIC_RMS_GAIN`, clamped to 1.
pub const HAPTIC_RMS_GAIN: f64 = 10.0;
