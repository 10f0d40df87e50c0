use displaydoc::Display;
use embedded_io::ErrorKind;

/// A specialized result type for the bridge.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Frame part being read when the serial stream failed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum Stage {
    /// length header
    Length,
    /// payload
    Payload,
}

/// Errors that can occur when receiving frames or configuring the bridge.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum Error {
    /// Expecting too many channels: declared {declared}, capacity {capacity}.
    OversizedFrame { declared: u16, capacity: u16 },
    /// Unable to read the frame {stage} from the serial stream: {kind:?}
    Serial { stage: Stage, kind: ErrorKind },
    /// Bit periods differ: {zero} ticks for a zero bit, {one} ticks for a one bit.
    UnbalancedTiming { zero: u32, one: u32 },
    /// Pulse phase duration {0} does not fit into a pulse item.
    DurationOutOfRange(u16),
    /// Channel capacity {0} is out of the supported range.
    CapacityOutOfRange(u16),
}

impl Error {
    /// Creates a new serial stream error.
    pub fn serial<E>(stage: Stage, err: E) -> Self
    where
        E: embedded_io::Error,
    {
        Self::Serial {
            stage,
            kind: err.kind(),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
