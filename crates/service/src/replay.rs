//! Recorded pose streams, one JSON `PoseFrame` per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use vrwheel_engine::{PoseFrame, PoseSource};
use vrwheel_errors::VrWheelError;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Cannot open pose recording {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads frames lazily. Blank lines and `#` comments are skipped; a line
/// that does not parse is logged and skipped. A read failure ends the
/// stream and is kept for [`PoseSource::take_error`].
#[derive(Debug)]
pub struct ReplayPoses<R> {
    lines: Lines<R>,
    line: usize,
    skipped: usize,
    stopped: bool,
    failure: Option<VrWheelError>,
}

impl ReplayPoses<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path).map_err(|source| ReplayError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayPoses<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            skipped: 0,
            stopped: false,
            failure: None,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> PoseSource for ReplayPoses<R> {
    fn poll(&mut self) -> Option<PoseFrame> {
        if self.stopped {
            return None;
        }
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(err) => {
                    let line = self.line + 1;
                    warn!(line, %err, "pose recording unreadable, stopping");
                    self.failure = Some(VrWheelError::device(format!(
                        "pose recording unreadable at line {line}: {err}"
                    )));
                    self.stopped = true;
                    return None;
                }
            };
            self.line += 1;
            let text = text.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<PoseFrame>(text) {
                Ok(frame) => return Some(frame),
                Err(err) => {
                    self.skipped += 1;
                    warn!(line = self.line, %err, "skipping malformed pose line");
                }
            }
        }
    }

    fn take_error(&mut self) -> Option<VrWheelError> {
        self.failure.take()
    }
}

/// Stands in for a tracker when nothing is replayed: every hand invalid.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePoses;

impl PoseSource for IdlePoses {
    fn poll(&mut self) -> Option<PoseFrame> {
        Some(PoseFrame::default())
    }
}
