//! The bridge worker loop.
//!
//! Every iteration walks through the same states:
//!
//! ```text
//! AwaitingLength -> AwaitingPayload -> Encoding -> Transmitting -> AwaitingLength
//! ```
//!
//! An oversized frame goes straight back to `AwaitingLength`.

use crate::{
    config::BridgeConfig,
    frame::FrameReader,
    pulse::{PulseBuffer, PulseEncoder, PulseItem},
    Error, PulseTransmitter, Result, TimeoutRead,
};

/// Result of a single bridge iteration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[must_use]
pub enum Outcome {
    /// The frame has been encoded and committed to the pulse peripheral.
    Transmitted { channels: usize, pulses: usize },
    /// The declared frame length does not fit into the channel buffer.
    Rejected { declared: u16 },
    /// The pulse peripheral refused the burst, the frame is dropped.
    TransmitFailed { channels: usize },
}

/// Serial to LED strip bridge worker.
///
/// Owns the serial stream, the pulse peripheral and every buffer needed to process
/// a frame, nothing is allocated per frame.
pub struct Bridge<S, T> {
    config: BridgeConfig,
    reader: FrameReader<S>,
    encoder: PulseEncoder,
    pulses: PulseBuffer,
    transmitter: T,
}

impl<S, T> Bridge<S, T>
where
    S: TimeoutRead,
    T: PulseTransmitter,
{
    /// Creates a new bridge worker with the given peripherals.
    pub fn new(config: BridgeConfig, serial: S, transmitter: T) -> Result<Self> {
        let config = config.validate()?;
        Ok(Self {
            config,
            reader: FrameReader::new(serial, config.max_channels, config.payload_timeout),
            encoder: PulseEncoder::new(config.timing),
            pulses: PulseBuffer::new(),
            transmitter,
        })
    }

    /// Runs the worker loop forever.
    ///
    /// Every failure is logged and the loop continues with the next frame.
    pub fn run(mut self) -> ! {
        log::info!(
            "Bridge started with capacity of {} channels",
            self.config.max_channels
        );

        loop {
            if let Err(err) = self.process_frame() {
                log::error!("{err}");
            }
        }
    }

    /// Reads, encodes and transmits a single frame.
    ///
    /// Only serial stream failures are returned as errors, oversized frames and
    /// transmission failures are logged and reported by the [`Outcome`].
    pub fn process_frame(&mut self) -> Result<Outcome> {
        let payload = match self.reader.read_frame() {
            Ok(payload) => payload,
            Err(err @ Error::OversizedFrame { declared, .. }) => {
                log::error!("{err}");
                return Ok(Outcome::Rejected { declared });
            }
            Err(err) => return Err(err),
        };
        log::trace!("Received frame with {} channels", payload.len());

        let channels = payload.len();
        let pulses = self.pulses.encode(&self.encoder, payload);
        match self.transmitter.transmit(pulses, false) {
            Ok(()) => Ok(Outcome::Transmitted {
                channels,
                pulses: pulses.len(),
            }),
            Err(err) => {
                log::error!("Pulse transmission failed: {err:?}");
                Ok(Outcome::TransmitFailed { channels })
            }
        }
    }

    /// Returns the bridge configuration.
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the pulse encoder used by the bridge.
    pub const fn encoder(&self) -> &PulseEncoder {
        &self.encoder
    }

    /// Returns the pulse items of the last encoded frame.
    pub fn pulses(&self) -> &[PulseItem] {
        self.pulses.as_slice()
    }

    /// Borrows the frame reader.
    pub fn reader(&self) -> &FrameReader<S> {
        &self.reader
    }

    /// Borrows the pulse peripheral.
    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    /// Mutably borrows the pulse peripheral.
    pub fn transmitter_mut(&mut self) -> &mut T {
        &mut self.transmitter
    }

    /// Consumes the bridge and returns the serial stream and the pulse peripheral.
    pub fn into_parts(self) -> (S, T) {
        (self.reader.into_inner(), self.transmitter)
    }
}
