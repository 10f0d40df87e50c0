//! SK6812 serial bridge core
//!
//! Receives length-prefixed channel frames from a serial stream and re-encodes every
//! channel byte into pulse items for a single-wire addressable LED strip.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
// Linter configuration
#![warn(unsafe_code, missing_copy_implementations)]
#![warn(clippy::pedantic)]
#![warn(clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

use core::time::Duration;

use embedded_io::blocking::Read;

pub use crate::{
    bridge::{Bridge, Outcome},
    config::{BridgeConfig, PulseTiming},
    errors::{Error, Result, Stage},
    frame::{frame_header, FrameReader},
    pulse::{Level, PulseBuffer, PulseEncoder, PulseItem},
};

pub mod bridge;
pub mod config;
pub mod errors;
pub mod frame;
pub mod pulse;
#[cfg(feature = "std")]
pub mod std_impl;

/// Maximum number of channels in a single frame.
pub const MAX_CHANNELS: usize = 2048;
/// Each channel bit is stretched into a single pulse item.
pub const MAX_PULSE_ITEMS: usize = MAX_CHANNELS * 8;

/// The blocking serial stream which can also wait for the incoming bytes no longer than
/// the specified time.
pub trait TimeoutRead: Read {
    /// Reads bytes into the given buffer, waiting for them at most `timeout`.
    ///
    /// Returns `Ok(0)` if nothing has arrived during this time.
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;
}

/// Pulse-generation peripheral which sends pulse items to the LED strip data line.
pub trait PulseTransmitter {
    /// Fault reported by the peripheral.
    type Error: core::fmt::Debug;
    /// Starts the transmission of the given pulse items as a single burst.
    ///
    /// If `wait` is false the method returns as soon as the burst has been
    /// committed, without waiting for the electrical transfer to finish.
    fn transmit(&mut self, pulses: &[PulseItem], wait: bool) -> Result<(), Self::Error>;
}
