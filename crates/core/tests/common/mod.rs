//! Test helpers

#![allow(dead_code)]

use std::{collections::VecDeque, time::Duration};

use embedded_io::{blocking::Read, ErrorKind, Io};
use sk6812_bridge_core::{PulseItem, PulseTransmitter, TimeoutRead};

/// Scripted serial stream behaviour.
#[derive(Debug, Clone)]
pub enum Event {
    /// A chunk of bytes arrives at once.
    Chunk(Vec<u8>),
    /// Nothing arrives during a timed read.
    Timeout,
}

/// The script has been played to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

impl embedded_io::Error for Exhausted {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// In-memory serial stream which replays the given events.
///
/// A timed read never returns more than the rest of the current chunk, the blocking
/// reads skip the timeouts.
#[derive(Debug, Default)]
pub struct ScriptedSerial {
    events: VecDeque<Event>,
    pending: VecDeque<u8>,
    pub timeouts: usize,
    pub timed_reads: usize,
    pub last_timeout: Option<Duration>,
}

impl ScriptedSerial {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whole stream delivered as a single chunk.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new([Event::Chunk(bytes.to_vec())])
    }

    /// Returns the bytes which have not been read yet.
    pub fn remaining(&self) -> Vec<u8> {
        let mut bytes = self.pending.iter().copied().collect::<Vec<_>>();
        for event in &self.events {
            if let Event::Chunk(chunk) = event {
                bytes.extend_from_slice(chunk);
            }
        }
        bytes
    }

    fn drain_pending(&mut self, buf: &mut [u8]) -> usize {
        let len = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..len)) {
            *slot = byte;
        }
        len
    }
}

impl Io for ScriptedSerial {
    type Error = Exhausted;
}

impl Read for ScriptedSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        while self.pending.is_empty() {
            match self.events.pop_front().ok_or(Exhausted)? {
                Event::Chunk(chunk) => self.pending.extend(chunk),
                Event::Timeout => {}
            }
        }
        Ok(self.drain_pending(buf))
    }
}

impl TimeoutRead for ScriptedSerial {
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        self.timed_reads += 1;
        self.last_timeout = Some(timeout);

        if self.pending.is_empty() {
            match self.events.pop_front().ok_or(Exhausted)? {
                Event::Chunk(chunk) => self.pending.extend(chunk),
                Event::Timeout => {
                    self.timeouts += 1;
                    return Ok(0);
                }
            }
        }
        Ok(self.drain_pending(buf))
    }
}

/// Peripheral fault reported by the [`RecordingTransmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy;

/// Pulse peripheral which records every committed burst.
#[derive(Debug, Default)]
pub struct RecordingTransmitter {
    pub bursts: Vec<Vec<PulseItem>>,
    pub wait_flags: Vec<bool>,
    /// Indices of the transmission attempts which should fail.
    pub failures: Vec<usize>,
    attempts: usize,
}

impl RecordingTransmitter {
    pub fn failing_on(failures: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failures: failures.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl PulseTransmitter for RecordingTransmitter {
    type Error = Busy;

    fn transmit(&mut self, pulses: &[PulseItem], wait: bool) -> Result<(), Self::Error> {
        let attempt = self.attempts;
        self.attempts += 1;
        self.wait_flags.push(wait);

        if self.failures.contains(&attempt) {
            return Err(Busy);
        }
        self.bursts.push(pulses.to_vec());
        Ok(())
    }
}

/// Builds a frame with the given payload.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = (payload.len() as u16).to_le_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
