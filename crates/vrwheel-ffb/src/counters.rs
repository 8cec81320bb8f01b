//! Diagnostic counters for the feedback callback path.
//!
//! Incremented from the driver thread without taking the table lock;
//! `Ordering::Relaxed` is enough since nothing synchronizes on them.

use core::sync::atomic::{AtomicU64, Ordering};

use vrwheel_errors::DecodeError;

/// Counter snapshot returned by [`FfbCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Packets handed to the decoder
    pub packets: u64,
    /// Packets applied to the effect table
    pub applied: u64,
    /// Report types with no handler
    pub unhandled: u64,
    /// Recognized reports that failed to decode
    pub malformed: u64,
    /// Haptic triggers emitted by synthesis
    pub haptic_triggers: u64,
}

/// # Example
///
/// ```rust
/// use vrwheel_errors::DecodeError;
/// use vrwheel_ffb::FfbCounters;
///
/// let counters = FfbCounters::new();
/// counters.inc_packet();
/// counters.record_error(DecodeError::UnknownReportType(0x08));
///
/// let snap = counters.snapshot();
/// assert_eq!(snap.packets, 1);
/// assert_eq!(snap.unhandled, 1);
/// assert_eq!(snap.malformed, 0);
/// ```
#[derive(Debug, Default)]
pub struct FfbCounters {
    packets: AtomicU64,
    applied: AtomicU64,
    unhandled: AtomicU64,
    malformed: AtomicU64,
    haptic_triggers: AtomicU64,
}

impl FfbCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_packet(&self) {
        self.packets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_applied(&self) {
        self.applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_haptic(&self) {
        self.haptic_triggers.fetch_add(1, Ordering::Relaxed);
    }

    /// Classify a decode failure as unhandled or malformed.
    #[inline]
    pub fn record_error(&self, err: DecodeError) {
        if err.is_malformed() {
            self.malformed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.unhandled.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            packets: self.packets.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            haptic_triggers: self.haptic_triggers.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.packets.store(0, Ordering::Relaxed);
        self.applied.store(0, Ordering::Relaxed);
        self.unhandled.store(0, Ordering::Relaxed);
        self.malformed.store(0, Ordering::Relaxed);
        self.haptic_triggers.store(0, Ordering::Relaxed);
    }
}
