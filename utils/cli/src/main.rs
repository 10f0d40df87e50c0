use std::{fs::File, io, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use sk6812_bridge_cli::{open_port, parse_channel, send_frame, PulseDump};
use sk6812_bridge_core::{
    config::DEFAULT_BAUD_RATE, std_impl::StdStream, Bridge, BridgeConfig, Error, Outcome,
    PulseEncoder, MAX_CHANNELS,
};

/// SK6812 serial bridge utility
///
/// A command line application for sending channel frames to the bridge over a serial
/// link, and for running the bridge itself on the host.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Actual command
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PortArgs {
    /// Serial port path
    #[arg(short, long)]
    port: String,
    /// Serial port baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a frame with the given channel values
    Send {
        #[command(flatten)]
        port: PortArgs,
        /// Channel values, decimal or `0x` prefixed hex
        #[arg(required = true, value_parser = parse_channel)]
        channels: Vec<u8>,
    },
    /// Send a frame with the same value in every channel
    Fill {
        #[command(flatten)]
        port: PortArgs,
        /// Number of channels
        #[arg(short, long)]
        count: u16,
        /// Channel value, decimal or `0x` prefixed hex
        #[arg(short = 'v', long, value_parser = parse_channel)]
        value: u8,
    },
    /// Run the bridge on the serial port and print every pulse burst
    Bridge {
        #[command(flatten)]
        port: PortArgs,
        /// Frames with this many channels or more are rejected
        #[arg(long, default_value_t = MAX_CHANNELS as u16)]
        capacity: u16,
        /// Timeout of a single payload read
        #[arg(long = "timeout-ms", default_value_t = 100_000, value_name = "MS")]
        timeout_ms: u64,
    },
    /// Run the bridge over a recorded byte stream until it ends
    Simulate {
        /// Recorded stream, standard input if omitted
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
        /// Frames with this many channels or more are rejected
        #[arg(long, default_value_t = MAX_CHANNELS as u16)]
        capacity: u16,
        /// Print every pulse item
        #[arg(long)]
        pulses: bool,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Send { port, channels } => {
            log::info!("Sending {} channels to {}", channels.len(), port.port);

            let device = open_port(&port.port, port.baud, Duration::from_secs(1))?;
            send_frame(device, &channels, MAX_CHANNELS as u16)?;
        }
        Command::Fill { port, count, value } => {
            log::info!("Filling {count} channels with {value:#04x} on {}", port.port);

            let device = open_port(&port.port, port.baud, Duration::from_secs(1))?;
            send_frame(device, &vec![value; count.into()], MAX_CHANNELS as u16)?;
        }
        Command::Bridge {
            port,
            capacity,
            timeout_ms,
        } => {
            let config = BridgeConfig {
                payload_timeout: Duration::from_millis(timeout_ms),
                ..BridgeConfig::DEFAULT.with_max_channels(capacity)
            };
            let device = open_port(&port.port, port.baud, config.payload_timeout)?;
            let dump = PulseDump::new(io::stdout(), PulseEncoder::new(config.timing), false);

            Bridge::new(config, StdStream::new(device), dump)?.run();
        }
        Command::Simulate {
            path,
            capacity,
            pulses,
        } => {
            let input: Box<dyn io::Read> = match &path {
                Some(path) => Box::new(
                    File::open(path).with_context(|| format!("Unable to open {path:?}"))?,
                ),
                None => Box::new(io::stdin()),
            };

            let config = BridgeConfig::DEFAULT.with_max_channels(capacity);
            let dump = PulseDump::new(io::stdout(), PulseEncoder::new(config.timing), pulses);
            let mut bridge = Bridge::new(config, StdStream::new(input), dump)?;

            let mut rejected = 0_usize;
            let mut failed = 0_usize;
            loop {
                match bridge.process_frame() {
                    Ok(Outcome::Transmitted { .. }) => {}
                    Ok(Outcome::Rejected { .. }) => rejected += 1,
                    Ok(Outcome::TransmitFailed { .. }) => failed += 1,
                    Err(err @ Error::Serial { .. }) => {
                        log::debug!("Recorded stream finished: {err}");
                        break;
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            log::info!(
                "Simulated {} frames, {rejected} rejected, {failed} failed",
                bridge.transmitter().frames()
            );
        }
        Command::Completions { shell } => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
    }

    Ok(())
}
