//! lightwire Emulator Binary
//!
//! Runs an emulated light so clients can be tried without hardware.

use clap::Parser;
use lightwire::network::emulator::{DeviceEmulator, EmulatorOptions};
use lightwire::protocol::DeviceErrorBody;
use tracing_subscriber::{fmt, EnvFilter};

/// lightwire device emulator
#[derive(Parser, Debug)]
#[command(name = "lightwire-emulator")]
#[command(about = "Emulated smart light speaking the LAN control protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:55443")]
    listen: String,

    /// Push a props notification before each reply to a state change
    #[arg(short, long)]
    notify: bool,

    /// Apply requests without replying
    #[arg(short, long)]
    silent: bool,

    /// Reject every request with this error message
    #[arg(short, long)]
    reject: Option<String>,

    /// Close each connection after this many requests
    #[arg(short, long)]
    close_after: Option<usize>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lightwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("lightwire emulator v{}", lightwire::VERSION);

    let options = EmulatorOptions {
        notify: args.notify,
        silent: args.silent,
        reject: args.reject.map(|message| DeviceErrorBody { code: -1, message }),
        close_after: args.close_after,
    };

    let emulator = match DeviceEmulator::bind(&args.listen, options) {
        Ok(emulator) => emulator,
        Err(e) => {
            tracing::error!("Failed to start emulator: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Emulated light ready on {}", emulator.addr());

    // Runs until the process is interrupted
    emulator.wait();
}
