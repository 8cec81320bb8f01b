//! In-memory and channel-backed port implementations.

use std::collections::{BTreeMap, VecDeque};

use crossbeam::channel::{Sender, TrySendError};
use tracing::trace;

use crate::ports::{
    Feedback, FeedbackSink, PoseSource, RenderSink, RenderSnapshot, VirtualControllerSink,
};
use crate::pose::PoseFrame;

/// Controller that remembers the last value written to every axis and
/// button.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryController {
    axes: BTreeMap<u8, i32>,
    buttons: BTreeMap<u8, bool>,
    writes: u64,
}

impl MemoryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(&self, axis: u8) -> Option<i32> {
        self.axes.get(&axis).copied()
    }

    /// Unwritten buttons read as released.
    pub fn button(&self, button: u8) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    pub fn pressed_buttons(&self) -> impl Iterator<Item = u8> + '_ {
        self.buttons.iter().filter(|(_, v)| **v).map(|(k, _)| *k)
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl VirtualControllerSink for MemoryController {
    fn set_axis(&mut self, axis: u8, value: i32) {
        self.writes = self.writes.saturating_add(1);
        self.axes.insert(axis, value);
    }

    fn set_button(&mut self, button: u8, pressed: bool) {
        self.writes = self.writes.saturating_add(1);
        self.buttons.insert(button, pressed);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingFeedback {
    pub events: Vec<Feedback>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.events)
    }
}

impl FeedbackSink for RecordingFeedback {
    fn send(&mut self, feedback: Feedback) {
        self.events.push(feedback);
    }
}

/// Hands feedback to another thread. A full or closed channel drops the
/// signal; the frame loop never waits on a consumer.
#[derive(Debug, Clone)]
pub struct ChannelFeedback {
    tx: Sender<Feedback>,
    dropped: u64,
}

impl ChannelFeedback {
    pub fn new(tx: Sender<Feedback>) -> Self {
        Self { tx, dropped: 0 }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl FeedbackSink for ChannelFeedback {
    fn send(&mut self, feedback: Feedback) {
        match self.tx.try_send(feedback) {
            Ok(()) => {}
            Err(TrySendError::Full(fb) | TrySendError::Disconnected(fb)) => {
                self.dropped = self.dropped.saturating_add(1);
                trace!(?fb, "feedback dropped");
            }
        }
    }
}

/// Keeps only the most recent snapshot.
#[derive(Debug, Clone, Default)]
pub struct LatestRender {
    pub last: Option<RenderSnapshot>,
    pub frames: u64,
}

impl RenderSink for LatestRender {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        self.frames = self.frames.saturating_add(1);
        self.last = Some(*snapshot);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullRender;

impl RenderSink for NullRender {
    fn render(&mut self, _snapshot: &RenderSnapshot) {}
}

/// Replays a fixed list of frames, then reports nothing new.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPoses {
    frames: VecDeque<PoseFrame>,
}

impl ScriptedPoses {
    pub fn new(frames: impl IntoIterator<Item = PoseFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl PoseSource for ScriptedPoses {
    fn poll(&mut self) -> Option<PoseFrame> {
        self.frames.pop_front()
    }
}
