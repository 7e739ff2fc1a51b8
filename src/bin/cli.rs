//! lightwire CLI Client
//!
//! Command-line interface for controlling one light.

use std::time::Duration;

use clap::{Parser, Subcommand};
use lightwire::network::discovery;
use lightwire::{
    ColorSpace, ColorSpec, Config, FadeEffect, FlowAction, FlowExpression, Light, LightError,
    Result,
};
use tracing_subscriber::{fmt, EnvFilter};

/// lightwire CLI
#[derive(Parser, Debug)]
#[command(name = "lightwire-cli")]
#[command(about = "Control a smart light over its LAN protocol")]
#[command(version)]
struct Args {
    /// Light IP address (not needed for `discover`)
    #[arg(short, long)]
    ip: Option<String>,

    /// Light TCP port
    #[arg(short, long, default_value = "55443")]
    port: u16,

    /// Connect and read timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Fade effect: smooth or sudden
    #[arg(short, long, default_value = "smooth")]
    effect: String,

    /// Fade duration in milliseconds (smooth only)
    #[arg(short, long)]
    duration: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the local network for lights
    Discover {
        /// How long to collect replies, in milliseconds
        #[arg(short, long, default_value = "3000")]
        wait_ms: u64,
    },

    /// Toggle the power state
    Toggle,

    /// Turn the light on
    On,

    /// Turn the light off
    Off,

    /// Set brightness (clamped to 0..=100)
    Bright {
        value: i64,
    },

    /// Set an RGB color, e.g. ff8800 or 0xff8800
    Rgb {
        color: String,
    },

    /// Set a color temperature in kelvin (1700..=6500)
    Ct {
        kelvin: i64,
    },

    /// Set hue (0..=359) and optional saturation (0..=100)
    Hsv {
        hue: i64,
        sat: Option<i64>,
    },

    /// Rename the light
    Name {
        name: String,
    },

    /// Read properties (bright, rgb, ct, hue, sat, name, power)
    Get {
        #[arg(required = true)]
        props: Vec<String>,
    },

    /// Start a color flow given as `duration,mode,value,brightness,...`
    Flow {
        expression: String,

        /// What to do when the flow ends: recover, stay or off
        #[arg(short, long, default_value = "recover")]
        action: String,
    },

    /// Stop a running color flow
    StopFlow,

    /// Save the current state as power-on default
    SetDefault,

    /// Print the current color
    Color {
        /// Color space: rgb, ct or hsv
        #[arg(default_value = "rgb")]
        space: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error ({:?}): {}", e.kind(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if let Commands::Discover { wait_ms } = args.command {
        for device in discovery::discover(Duration::from_millis(wait_ms))? {
            println!(
                "{}:{}  model={}  name={}  power={}",
                device.ip,
                device.port,
                device.model.as_deref().unwrap_or("?"),
                device.name.as_deref().unwrap_or(""),
                device.power.map(|on| if on { "on" } else { "off" }).unwrap_or("?"),
            );
        }
        return Ok(());
    }

    let ip = args
        .ip
        .as_deref()
        .ok_or_else(|| LightError::Config("--ip is required for this command".to_string()))?;

    let config = Config::builder()
        .port(args.port)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .default_effect(FadeEffect::parse(Some(args.effect.as_str()), args.duration)?)
        .build();

    let mut light = Light::connect(ip, config)?;

    match args.command {
        Commands::Discover { .. } => unreachable!("handled above"),
        Commands::Toggle => {
            light.toggle();
        }
        Commands::On => {
            light.turn_on()?;
        }
        Commands::Off => {
            light.turn_off()?;
        }
        Commands::Bright { value } => {
            light.set_brightness(value)?;
        }
        Commands::Rgb { color } => {
            light.set_color(ColorSpec::rgb(parse_hex(&color)?)?)?;
        }
        Commands::Ct { kelvin } => {
            light.set_color(ColorSpec::ct(kelvin)?)?;
        }
        Commands::Hsv { hue, sat } => {
            light.set_color(ColorSpec::hsv(hue, sat)?)?;
        }
        Commands::Name { name } => {
            light.set_name(name);
        }
        Commands::Flow { expression, action } => {
            let flow = FlowExpression::parse(&expression)?;
            let action: FlowAction = action.parse()?;
            light.start_color_flow(flow, action);
        }
        Commands::SetDefault => {
            light.set_default();
        }
        Commands::StopFlow => {
            light.stop_color_flow()?;
            println!("ok");
            return Ok(());
        }
        Commands::Get { props } => {
            let names: Vec<&str> = props.iter().map(String::as_str).collect();
            for (prop, value) in light.get_props(&names)?.iter() {
                println!("{}: {}", prop, value);
            }
            return Ok(());
        }
        Commands::Color { space } => {
            let space: ColorSpace = space.parse()?;
            println!("{:?}", light.color(space)?);
            return Ok(());
        }
    }

    let report = light.commit()?;
    for outcome in report.outcomes() {
        println!("{} (id {}): {:?}", outcome.method, outcome.id, outcome.status);
    }
    if !report.succeeded() {
        std::process::exit(2);
    }
    Ok(())
}

fn parse_hex(color: &str) -> Result<i64> {
    let digits = color
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    i64::from_str_radix(digits, 16)
        .map_err(|_| LightError::Validation(format!("Invalid hex color '{}'", color)))
}
