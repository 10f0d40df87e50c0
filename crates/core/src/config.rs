//! Compiled-in bridge settings.

use core::time::Duration;

use crate::{pulse::PulseItem, Error, Result, MAX_CHANNELS};

/// Default serial link baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Depth of the serial receive buffer, large enough to hold a whole frame payload.
pub const SERIAL_RX_BUFFER_LEN: usize = MAX_CHANNELS;
/// Pulse peripheral clock divider applied to the 80 MHz APB clock.
pub const PULSE_CLOCK_DIVIDER: u8 = 8;
/// Duration of a single pulse peripheral tick with the default clock divider.
pub const TICK_NANOS: u32 = 100;
/// GPIO connected to the LED strip data line.
pub const DATA_PIN: u8 = 13;
/// Default timeout of a single payload read attempt.
pub const PAYLOAD_READ_TIMEOUT: Duration = Duration::from_millis(100_000);

/// High and low phase durations of the encoded bits, in peripheral ticks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PulseTiming {
    /// High phase of a zero bit.
    pub t0h: u16,
    /// Low phase of a zero bit.
    pub t0l: u16,
    /// High phase of a one bit.
    pub t1h: u16,
    /// Low phase of a one bit.
    pub t1l: u16,
}

impl PulseTiming {
    /// SK6812 timings with 100ns ticks: 0.3/0.9µs for zero and 0.6/0.6µs for one.
    pub const SK6812: Self = Self {
        t0h: 3,
        t0l: 9,
        t1h: 6,
        t1l: 6,
    };

    /// Total duration of a zero bit.
    pub const fn zero_period(self) -> u32 {
        self.t0h as u32 + self.t0l as u32
    }

    /// Total duration of a one bit.
    pub const fn one_period(self) -> u32 {
        self.t1h as u32 + self.t1l as u32
    }

    /// Checks that every phase fits into a pulse item and both bits take the same time.
    ///
    /// LED drivers sample the duty cycle of a fixed bit period, so unbalanced timings
    /// are rejected.
    pub fn validate(self) -> Result<Self> {
        for duration in [self.t0h, self.t0l, self.t1h, self.t1l] {
            if duration == 0 || duration > PulseItem::MAX_DURATION {
                return Err(Error::DurationOutOfRange(duration));
            }
        }

        if self.zero_period() != self.one_period() {
            return Err(Error::UnbalancedTiming {
                zero: self.zero_period(),
                one: self.one_period(),
            });
        }
        Ok(self)
    }
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self::SK6812
    }
}

/// A bridge worker configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BridgeConfig {
    /// Frames declaring this many channels or more are rejected.
    pub max_channels: u16,
    /// Pulse timings of the encoded bits.
    pub timing: PulseTiming,
    /// Timeout of a single payload read attempt.
    pub payload_timeout: Duration,
}

impl BridgeConfig {
    /// Default configuration which uses the whole channel buffer.
    pub const DEFAULT: Self = Self {
        max_channels: MAX_CHANNELS as u16,
        timing: PulseTiming::SK6812,
        payload_timeout: PAYLOAD_READ_TIMEOUT,
    };

    /// Returns the same configuration with the given channel capacity.
    #[must_use]
    pub const fn with_max_channels(mut self, max_channels: u16) -> Self {
        self.max_channels = max_channels;
        self
    }

    /// Checks the channel capacity and the pulse timings.
    pub fn validate(self) -> Result<Self> {
        if self.max_channels == 0 || usize::from(self.max_channels) > MAX_CHANNELS {
            return Err(Error::CapacityOutOfRange(self.max_channels));
        }
        self.timing.validate()?;
        Ok(self)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
