//! Length-prefixed frame reader.
//!
//! Every frame on the wire consists of a little-endian `u16` channels count followed
//! by exactly that many channel bytes. There is no checksum and no acknowledgement.

use core::time::Duration;

use crate::{Error, Result, Stage, TimeoutRead, MAX_CHANNELS};

/// Encodes a frame header for the given channels count.
///
/// Returns an error if the bridge with the given capacity would reject such frame.
pub fn frame_header(len: usize, capacity: u16) -> Result<[u8; 2]> {
    match u16::try_from(len) {
        Ok(declared) if declared < capacity => Ok(declared.to_le_bytes()),
        _ => Err(Error::OversizedFrame {
            declared: u16::try_from(len).unwrap_or(u16::MAX),
            capacity,
        }),
    }
}

/// Reads complete frames from the serial stream into the pre-allocated channel buffer.
pub struct FrameReader<S> {
    serial: S,
    capacity: u16,
    payload_timeout: Duration,
    channels: heapless::Vec<u8, MAX_CHANNELS>,
}

impl<S: TimeoutRead> FrameReader<S> {
    /// Creates a new frame reader.
    ///
    /// # Panics
    ///
    /// - If the capacity exceeds [`MAX_CHANNELS`].
    pub fn new(serial: S, capacity: u16, payload_timeout: Duration) -> Self {
        assert!(
            usize::from(capacity) <= MAX_CHANNELS,
            "Channel capacity {capacity} exceeds the maximum {MAX_CHANNELS}"
        );

        Self {
            serial,
            capacity,
            payload_timeout,
            channels: heapless::Vec::new(),
        }
    }

    /// Reads the next frame and returns its channel bytes.
    ///
    /// The payload of an oversized frame is left unread in the stream, so the next call
    /// interprets its first bytes as a frame header.
    pub fn read_frame(&mut self) -> Result<&[u8]> {
        let declared = self.read_length()?;
        if declared >= self.capacity {
            return Err(Error::OversizedFrame {
                declared,
                capacity: self.capacity,
            });
        }

        self.read_payload(usize::from(declared))?;
        Ok(&self.channels)
    }

    /// Reads a frame length header.
    ///
    /// Both header bytes are awaited without any timeout.
    pub fn read_length(&mut self) -> Result<u16> {
        let mut header = [0_u8; 2];
        for byte in &mut header {
            while self
                .serial
                .read(core::slice::from_mut(byte))
                .map_err(|err| Error::serial(Stage::Length, err))?
                != 1
            {}
        }
        Ok(u16::from_le_bytes(header))
    }

    fn read_payload(&mut self, len: usize) -> Result<()> {
        self.channels.clear();
        // The length has already been checked against the capacity.
        self.channels
            .resize_default(len)
            .map_err(|()| Error::OversizedFrame {
                declared: len as u16,
                capacity: self.capacity,
            })?;

        let mut offset = 0;
        while offset < len {
            let bytes_read = self
                .serial
                .read_timeout(&mut self.channels[offset..], self.payload_timeout)
                .map_err(|err| Error::serial(Stage::Payload, err))?;
            if bytes_read == 0 {
                log::trace!("Payload read timed out, {} bytes left", len - offset);
            }
            offset += bytes_read;
        }
        Ok(())
    }

    /// Returns the channel capacity.
    pub const fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Returns the channel bytes of the last successfully read frame.
    pub fn channels(&self) -> &[u8] {
        &self.channels
    }

    /// Borrows the underlying serial stream.
    pub fn get_ref(&self) -> &S {
        &self.serial
    }

    /// Mutably borrows the underlying serial stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Consumes the reader and returns the underlying serial stream.
    pub fn into_inner(self) -> S {
        self.serial
    }
}
