//! Feeds recorded FFB packets to the shared state from a driver-like thread.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};
use vrwheel_ffb::{CounterSnapshot, FfbHandle};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Cannot read FFB recording {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Line {line}: not a hex packet: {source}")]
    Hex {
        line: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Cannot start FFB feeder thread: {0}")]
    Spawn(#[source] io::Error),
}

/// One packet per line as hex digits; whitespace inside a line is ignored.
/// Blank lines and `#` comments yield `None`.
pub fn parse_packet_line(line: &str) -> Result<Option<Vec<u8>>, hex::FromHexError> {
    let text = line.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(digits).map(Some)
}

pub fn load_packets(path: &Path) -> Result<Vec<Vec<u8>>, FeedError> {
    let text = fs::read_to_string(path).map_err(|source| FeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut packets = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let parsed = parse_packet_line(line).map_err(|source| FeedError::Hex {
            line: index + 1,
            source,
        })?;
        packets.extend(parsed);
    }
    Ok(packets)
}

/// Deliver `packets` to `ffb`, one every `interval`, on a new thread. The
/// thread returns the decoder counters once everything has been sent.
pub fn spawn_feeder(
    packets: Vec<Vec<u8>>,
    ffb: FfbHandle,
    interval: Duration,
) -> Result<JoinHandle<CounterSnapshot>, FeedError> {
    thread::Builder::new()
        .name("ffb-feed".into())
        .spawn(move || {
            debug!(count = packets.len(), "feeding FFB packets");
            for packet in &packets {
                ffb.handle_packet(packet, Instant::now());
                thread::sleep(interval);
            }
            let counters = ffb.counters();
            if counters.malformed > 0 {
                warn!(malformed = counters.malformed, "FFB recording had malformed packets");
            }
            counters
        })
        .map_err(FeedError::Spawn)
}
