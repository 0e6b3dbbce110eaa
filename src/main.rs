use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use gateway_link::{Config, Controller, PinMode, Telemetry, UsablePin, config, telemetry};

#[derive(Parser)]
#[command(name = "gateway-link", about = "Drive an I/O gateway over the I2C bus", author)]
struct Cli {
    /// YAML link configuration, the built-in one is used if omitted
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Bus device node, overrides the configuration
    #[arg(long)]
    bus: Option<String>,
    /// Gateway bus address (e.g. 0x40), overrides the configuration
    #[arg(long, short, value_parser = parse_address)]
    address: Option<u8>,
    /// Log every frame on the bus
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure a pin direction
    PinMode {
        pin: UsablePin,
        #[arg(value_enum)]
        mode: PinMode,
    },
    /// Drive a digital output
    DigitalWrite {
        pin: UsablePin,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Sample a digital input
    DigitalRead { pin: UsablePin },
    /// Set a PWM duty cycle
    AnalogWrite { pin: UsablePin, value: u8 },
    /// Sample an analog input
    AnalogRead { pin: UsablePin },
    /// Dump the maneuver bytes received from the operator
    Maneuver {},
    /// Print the URL requested by the operator
    Url {},
    /// Print the last GPS fix
    Gps {},
    /// Upload a string to the operator
    Send { text: String },
    /// Read the GPS fix and upload it with the given sensor readings
    Telemetry {
        /// Compass heading in degrees
        heading: u16,
        /// Leak alert flag
        #[arg(long, default_value_t = 0)]
        leak: u8,
        #[arg(long, default_value_t = telemetry::NOT_MEASURED, allow_negative_numbers = true)]
        battery1: i32,
        #[arg(long, default_value_t = telemetry::NOT_MEASURED, allow_negative_numbers = true)]
        battery2: i32,
    },
}

fn parse_address(s: &str) -> Result<u8> {
    let address = config::parse_address_str(s)?;
    anyhow::ensure!(address < 0x80, "0x{:02x} is not a 7-bit address", address);
    Ok(address)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::builtin()?,
    };
    if let Some(bus) = cli.bus {
        config.bus = bus;
    }
    if let Some(address) = cli.address {
        config.address = address;
    }
    let address = config.address;
    log::info!("Gateway at 0x{:02x} on {}", address, config.bus);

    let mut gateway = Controller::open(&config)?;
    match cli.command {
        Commands::PinMode { pin, mode } => {
            gateway.pin_mode(address, pin, mode)?;
        }
        Commands::DigitalWrite { pin, value } => {
            gateway.digital_write(address, pin, value)?;
        }
        Commands::DigitalRead { pin } => {
            let value = gateway.digital_read(address, pin)?;
            println!("{}", value);
        }
        Commands::AnalogWrite { pin, value } => {
            gateway.analog_write(address, pin, value)?;
        }
        Commands::AnalogRead { pin } => {
            let value = gateway.analog_read(address, pin)?;
            println!("{}", value);
        }
        Commands::Maneuver {} => {
            let bytes = gateway.maneuver_bytes(address)?;
            println!("{}", hex::encode(bytes));
        }
        Commands::Url {} => {
            let url = gateway.requested_url(address)?;
            if url.is_empty() {
                log::info!("No URL requested");
            } else {
                println!("{}", url);
            }
        }
        Commands::Gps {} => {
            let gps = gateway.gps(address)?;
            if !gps.validity().location() {
                log::warn!("Location is not valid");
            }
            print!("{}", serde_yaml::to_string(&gps)?);
        }
        Commands::Send { text } => {
            gateway.send_string(address, &text)?;
            log::info!("Sent {} bytes", text.len());
        }
        Commands::Telemetry {
            heading,
            leak,
            battery1,
            battery2,
        } => {
            let gps = gateway.gps(address)?;
            let telemetry = Telemetry::new(gps, heading, leak).with_batteries(battery1, battery2);
            gateway.send_sensor_data(address, &telemetry)?;
        }
    }

    Ok(())
}
