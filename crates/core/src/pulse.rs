//! Bit to pulse encoding.

use core::fmt;

use crate::{config::PulseTiming, MAX_PULSE_ITEMS};

/// Logic level of the data line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

/// A two-phase pulse: `level0` held for `duration0` ticks, then `level1` held for
/// `duration1` ticks.
///
/// Packed into a single word in the pulse peripheral memory layout: bits 0..=14 hold
/// `duration0`, bit 15 `level0`, bits 16..=30 `duration1` and bit 31 `level1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PulseItem(u32);

impl PulseItem {
    /// Longest phase duration which fits into a pulse item.
    pub const MAX_DURATION: u16 = 0x7FFF;
    /// Zero-length low pulse.
    pub const EMPTY: Self = Self(0);

    /// Creates a new pulse item, durations are truncated to 15 bits.
    pub const fn new(level0: Level, duration0: u16, level1: Level, duration1: u16) -> Self {
        let low = (duration0 & Self::MAX_DURATION) as u32 | ((level0 as u32) << 15);
        let high = (duration1 & Self::MAX_DURATION) as u32 | ((level1 as u32) << 15);
        Self(low | (high << 16))
    }

    /// Creates a pulse item from its raw peripheral representation.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw peripheral representation.
    pub const fn into_raw(self) -> u32 {
        self.0
    }

    pub const fn level0(self) -> Level {
        Self::level(self.0 >> 15)
    }

    pub const fn duration0(self) -> u16 {
        (self.0 as u16) & Self::MAX_DURATION
    }

    pub const fn level1(self) -> Level {
        Self::level(self.0 >> 31)
    }

    pub const fn duration1(self) -> u16 {
        ((self.0 >> 16) as u16) & Self::MAX_DURATION
    }

    /// Total duration of both phases.
    pub const fn period(self) -> u32 {
        self.duration0() as u32 + self.duration1() as u32
    }

    const fn level(bit: u32) -> Level {
        if bit & 1 == 1 {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl fmt::Debug for PulseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PulseItem({:?} {}, {:?} {})",
            self.level0(),
            self.duration0(),
            self.level1(),
            self.duration1()
        )
    }
}

/// Translates channel bytes into pulse items, most significant bit first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PulseEncoder {
    zero: PulseItem,
    one: PulseItem,
}

impl PulseEncoder {
    /// Pulse items per encoded byte.
    pub const PULSES_PER_BYTE: usize = 8;

    /// Creates a new encoder with the given bit timings.
    ///
    /// The timings are expected to be validated by [`PulseTiming::validate`].
    pub const fn new(timing: PulseTiming) -> Self {
        Self {
            zero: PulseItem::new(Level::High, timing.t0h, Level::Low, timing.t0l),
            one: PulseItem::new(Level::High, timing.t1h, Level::Low, timing.t1l),
        }
    }

    /// Returns a pulse item for the given bit value.
    #[inline]
    pub const fn bit(&self, value: bool) -> PulseItem {
        if value {
            self.one
        } else {
            self.zero
        }
    }

    /// Returns the eight pulse items of a single byte.
    #[inline]
    pub fn byte(&self, byte: u8) -> [PulseItem; Self::PULSES_PER_BYTE] {
        let mut items = [PulseItem::EMPTY; Self::PULSES_PER_BYTE];
        for (i, item) in items.iter_mut().enumerate() {
            *item = self.bit(byte & (0b1000_0000 >> i) != 0);
        }
        items
    }

    /// Encodes the payload into exactly `8 * payload.len()` pulse items.
    #[inline]
    pub fn encode<'a>(&'a self, payload: &'a [u8]) -> impl Iterator<Item = PulseItem> + 'a {
        payload.iter().flat_map(|&byte| self.byte(byte))
    }

    /// Recognizes the bit value encoded by the given pulse item.
    pub fn decode_bit(&self, item: PulseItem) -> Option<bool> {
        if item == self.one {
            Some(true)
        } else if item == self.zero {
            Some(false)
        } else {
            None
        }
    }

    /// Reconstructs bytes from pulse items, a byte is `None` if any of its items is unknown.
    ///
    /// Trailing items which do not form a whole byte are ignored.
    pub fn decode<'a>(&'a self, items: &'a [PulseItem]) -> impl Iterator<Item = Option<u8>> + 'a {
        items.chunks_exact(Self::PULSES_PER_BYTE).map(|chunk| {
            chunk.iter().try_fold(0_u8, |byte, &item| {
                self.decode_bit(item).map(|bit| (byte << 1) | u8::from(bit))
            })
        })
    }
}

impl Default for PulseEncoder {
    fn default() -> Self {
        Self::new(PulseTiming::SK6812)
    }
}

/// Pre-allocated storage of the pulse items for a whole frame.
pub struct PulseBuffer {
    items: [PulseItem; MAX_PULSE_ITEMS],
    len: usize,
}

impl PulseBuffer {
    /// Creates a new empty buffer.
    pub const fn new() -> Self {
        Self {
            items: [PulseItem::EMPTY; MAX_PULSE_ITEMS],
            len: 0,
        }
    }

    /// Replaces the buffer content by the pulse items of the given payload.
    ///
    /// # Panics
    ///
    /// - If the payload is longer than [`crate::MAX_CHANNELS`].
    pub fn encode(&mut self, encoder: &PulseEncoder, payload: &[u8]) -> &[PulseItem] {
        let len = payload.len() * PulseEncoder::PULSES_PER_BYTE;
        for (slot, item) in self.items[..len].iter_mut().zip(encoder.encode(payload)) {
            *slot = item;
        }
        self.len = len;
        self.as_slice()
    }

    /// Returns pulse items of the last encoded payload.
    pub fn as_slice(&self) -> &[PulseItem] {
        &self.items[..self.len]
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for PulseBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: u32 = 12;

    #[test]
    fn test_pulse_item_layout() {
        let item = PulseItem::new(Level::High, 6, Level::Low, 9);
        assert_eq!(item.into_raw(), 0x0009_8006);
        assert_eq!(item.level0(), Level::High);
        assert_eq!(item.duration0(), 6);
        assert_eq!(item.level1(), Level::Low);
        assert_eq!(item.duration1(), 9);
        assert_eq!(PulseItem::from_raw(0x0009_8006), item);

        let item = PulseItem::new(Level::Low, 0x7FFF, Level::High, 1);
        assert_eq!(item.into_raw(), 0x8001_7FFF);
        assert_eq!(item.duration0(), PulseItem::MAX_DURATION);
        assert_eq!(item.level1(), Level::High);
    }

    #[test]
    fn test_encode_every_byte_value() {
        let encoder = PulseEncoder::default();
        let timing = PulseTiming::SK6812;

        for byte in 0..=u8::MAX {
            let items = encoder.encode(&[byte]).collect::<Vec<_>>();
            assert_eq!(items.len(), 8);

            let reconstructed = items.iter().fold(0_u8, |acc, item| {
                (acc << 1) | u8::from(item.duration0() == timing.t1h)
            });
            assert_eq!(reconstructed, byte);

            for item in items {
                assert_eq!(item.level0(), Level::High);
                assert_eq!(item.level1(), Level::Low);
                assert_eq!(item.period(), PERIOD);
            }
        }
    }

    #[test]
    fn test_encode_msb_first() {
        let encoder = PulseEncoder::default();
        let items = encoder.byte(0b1000_0001);

        assert_eq!(items[0], PulseItem::new(Level::High, 6, Level::Low, 6));
        assert_eq!(items[1], PulseItem::new(Level::High, 3, Level::Low, 9));
        assert_eq!(items[7], PulseItem::new(Level::High, 6, Level::Low, 6));
    }

    #[test]
    fn test_encode_is_idempotent() {
        let encoder = PulseEncoder::default();
        let payload = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0xFF];

        let first = encoder.encode(&payload).collect::<Vec<_>>();
        let second = encoder.encode(&payload).collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(first.len(), payload.len() * 8);
    }

    #[test]
    fn test_decode_roundtrip() {
        let encoder = PulseEncoder::default();
        let payload = [0xAA, 0x55, 0x01];
        let items = encoder.encode(&payload).collect::<Vec<_>>();

        let decoded = encoder.decode(&items).collect::<Vec<_>>();
        assert_eq!(decoded, [Some(0xAA), Some(0x55), Some(0x01)]);
    }

    #[test]
    fn test_decode_unknown_item() {
        let encoder = PulseEncoder::default();
        let mut items = encoder.byte(0xF0).to_vec();
        items[3] = PulseItem::new(Level::High, 1, Level::Low, 11);

        assert_eq!(encoder.decode_bit(items[3]), None);
        assert_eq!(encoder.decode(&items).collect::<Vec<_>>(), [None]);
    }

    #[test]
    fn test_pulse_buffer_reuse() {
        let encoder = PulseEncoder::default();
        let mut buffer = Box::new(PulseBuffer::new());
        assert!(buffer.is_empty());

        let long = buffer.encode(&encoder, &[0xFF; 4]).to_vec();
        assert_eq!(long.len(), 32);

        // A shorter frame never exposes stale items of the previous one.
        let short = buffer.encode(&encoder, &[0x00]);
        assert_eq!(short.len(), 8);
        assert!(short.iter().all(|item| item.duration0() == 3));
        assert_eq!(buffer.len(), 8);

        assert!(buffer.encode(&encoder, &[]).is_empty());
    }
}
