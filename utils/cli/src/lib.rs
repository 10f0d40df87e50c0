//! Host side helpers of the bridge utility.

use std::{io, time::Duration};

use sk6812_bridge_core::{frame_header, PulseEncoder, PulseItem, PulseTransmitter};

/// Parses a channel value given either in decimal or in `0x` prefixed hex form.
pub fn parse_channel(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("invalid channel value `{s}`: {err}"))
}

/// Opens a serial port with the given baud rate and read timeout.
pub fn open_port(
    path: &str,
    baud_rate: u32,
    timeout: Duration,
) -> anyhow::Result<Box<dyn serialport::SerialPort>> {
    let port = serialport::new(path, baud_rate).timeout(timeout).open()?;
    log::info!("Opened serial port {path} at {baud_rate} baud");
    Ok(port)
}

/// Writes a single frame with the given channel values.
pub fn send_frame<W: io::Write>(
    mut device: W,
    channels: &[u8],
    capacity: u16,
) -> anyhow::Result<()> {
    let header = frame_header(channels.len(), capacity)?;
    device.write_all(&header)?;
    device.write_all(channels)?;
    device.flush()?;
    Ok(())
}

/// Pulse "peripheral" which prints a summary of every burst.
#[derive(Debug)]
pub struct PulseDump<W> {
    out: W,
    encoder: PulseEncoder,
    show_pulses: bool,
    frames: usize,
}

impl<W: io::Write> PulseDump<W> {
    pub fn new(out: W, encoder: PulseEncoder, show_pulses: bool) -> Self {
        Self {
            out,
            encoder,
            show_pulses,
            frames: 0,
        }
    }

    /// Returns the number of dumped bursts.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: io::Write> PulseTransmitter for PulseDump<W> {
    type Error = io::Error;

    fn transmit(&mut self, pulses: &[PulseItem], _wait: bool) -> Result<(), Self::Error> {
        let channels = self
            .encoder
            .decode(pulses)
            .map(|byte| byte.map_or_else(|| "??".to_owned(), |byte| format!("{byte:02x}")))
            .collect::<Vec<_>>();

        writeln!(
            self.out,
            "frame #{}: {} channels, {} pulses: [{}]",
            self.frames,
            channels.len(),
            pulses.len(),
            channels.join(" ")
        )?;
        if self.show_pulses {
            for item in pulses {
                writeln!(self.out, "  {item:?}")?;
            }
        }

        self.frames += 1;
        Ok(())
    }
}
