//! irlink CLI
//!
//! Opens a session with the IR emitter and sends one command.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use irlink::{Command, Config, Controller, LoopbackChannel, Message, ProtocolCode};
use tracing_subscriber::{fmt, EnvFilter};

/// irlink CLI
#[derive(Parser, Debug)]
#[command(name = "irlink-cli")]
#[command(about = "Drive a serial-attached IR remote emitter")]
#[command(version)]
struct Args {
    /// Serial port
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value = "9600")]
    baud: u32,

    /// Read/write timeout in milliseconds
    #[arg(short, long, default_value = "1000")]
    timeout_ms: u64,

    /// Session name used in logs
    #[arg(short, long)]
    name: Option<String>,

    /// Keep going after a NAC instead of failing the command
    #[arg(long)]
    lenient: bool,

    /// Talk to the built-in loopback emulator instead of a serial port
    #[arg(long)]
    loopback: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a session and close it again
    Handshake,

    /// Send an IR code
    Send {
        /// Code to emit, decimal or 0x-prefixed hex
        #[arg(value_parser = parse_code)]
        code: u32,

        /// IR protocol (unknown, nec, sony, necx)
        #[arg(short = 'P', long, default_value = "necx")]
        protocol: ProtocolCode,

        /// Code size in bits
        #[arg(short, long, default_value = "32")]
        size: u8,
    },
}

fn parse_code(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid code {:?}: {}", s, e))
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,irlink=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("irlink CLI v{}", irlink::VERSION);

    let timeout = Duration::from_millis(args.timeout_ms);
    let mut builder = Config::builder()
        .port(&args.port)
        .baud_rate(args.baud)
        .timeout(timeout)
        .write_timeout(timeout)
        .fail_fast(!args.lenient);
    if let Some(name) = &args.name {
        builder = builder.name(name);
    }
    let config = builder.build();

    let mut controller = if args.loopback {
        tracing::info!("Using loopback emulator");
        Controller::new(config, LoopbackChannel::new().factory())
    } else {
        tracing::info!("Port: {} at {} baud", args.port, args.baud);
        Controller::serial(config)
    };

    match run(&mut controller, &args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(controller: &mut Controller, command: &Commands) -> irlink::Result<()> {
    let mut session = controller.session()?;

    if let Commands::Send {
        code,
        protocol,
        size,
    } = command
    {
        let message = Message::Command(Command::new(*code, *protocol, *size));
        let acks = session.send(&message, false)?;

        let failed = acks.iter().filter(|ack| ack.is_nac()).count();
        if failed > 0 {
            tracing::warn!("{} of {} steps were not acknowledged", failed, acks.len());
        }
    }

    session.close()
}
