//! CLI application for controlling Wiz lights.
//!
//! Run with: cargo run --example wiz_cli -- --help

use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use wiz_rave::{Controller, ControllerConfig, NamedColor, TemperaturePreset};

#[derive(Parser)]
#[command(name = "wiz-cli")]
#[command(about = "Discover and control Wiz smart lights from the command line", long_about = None)]
struct Cli {
    /// IP address(es) of the target lights (not required for discover)
    #[arg(short, long, global = true, value_delimiter = ',')]
    ip: Vec<Ipv4Addr>,

    /// Seconds to wait for each reply
    #[arg(long, global = true, default_value = "2", value_parser = parse_seconds)]
    reply_timeout: Duration,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep the local /24 for Wiz lights
    Discover {
        /// Discovery window in seconds
        #[arg(short, long, default_value = "5")]
        timeout: u64,
    },

    /// Get the current status of each light
    Status,

    /// Turn the lights on
    On,

    /// Turn the lights off
    Off,

    /// Set brightness (clamped to 10-100)
    Brightness { level: i64 },

    /// Set a color by name, preset or "r,g,b"
    Color {
        /// e.g. red, "warm white", 255,128,0
        color: String,
    },

    /// Set color temperature in Kelvin (clamped to 2200-6500)
    Temperature { kelvin: i64 },

    /// Blink each light red/blue so you can tell which is which
    Identify {
        #[arg(short, long, default_value = "3")]
        cycles: usize,
    },

    /// Cycle random colors until the duration elapses
    Rave {
        /// Seconds between color changes
        #[arg(short, long, default_value = "1.0", value_parser = parse_seconds)]
        interval: Duration,
        /// How long to run, in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,
        /// Restrict to these color names
        #[arg(short, long, value_delimiter = ',')]
        palette: Vec<String>,
    },
}

/// Parse a non-negative, finite number of seconds.
fn parse_seconds(arg: &str) -> Result<Duration, String> {
    let secs: f64 = arg.parse().map_err(|e| format!("{arg:?} is not a number: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{arg:?} is not a valid duration: {e}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ControllerConfig::default().with_request_timeout(cli.reply_timeout);
    if let Commands::Discover { timeout } = cli.command {
        config = config.with_discovery_window(Duration::from_secs(timeout));
    }
    let controller = Controller::with_devices(cli.ip.iter().copied(), config);

    if let Commands::Discover { timeout } = cli.command {
        println!("Discovering Wiz lights on the network (timeout: {}s)...", timeout);
        match controller.discover().await {
            Ok(bulbs) if bulbs.is_empty() => println!("No lights found on the network."),
            Ok(bulbs) => {
                println!("\nFound {} light(s):", bulbs.len());
                for ip in bulbs {
                    let status = controller.status_of(ip).unwrap_or_default();
                    println!("  IP: {:15}  MAC: {}", ip.to_string(), status.mac().unwrap_or("?"));
                }
            }
            Err(e) => eprintln!("Error during discovery: {}", e),
        }
        return Ok(());
    }

    // All other commands require at least one IP address
    let ips = controller.devices();
    if ips.is_empty() {
        return Err("IP address is required for this command. Use --ip <IP>[,<IP>...]".into());
    }

    match cli.command {
        Commands::Discover { .. } => unreachable!(),

        Commands::Status => {
            for ip in &ips {
                match controller.get_status(*ip).await {
                    Some(status) => {
                        println!("\n{}:", ip);
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    }
                    None => println!("\n{}: no response", ip),
                }
            }
        }

        Commands::On => controller.set_power(&ips, true).await,

        Commands::Off => controller.set_power(&ips, false).await,

        Commands::Brightness { level } => controller.set_brightness(&ips, level).await,

        Commands::Color { color } => match color.parse::<wiz_rave::Color>() {
            Ok(rgb) => controller.set_color(&ips, rgb).await,
            Err(_) => controller.set_color(&ips, color).await,
        },

        Commands::Temperature { kelvin } => controller.set_temperature(&ips, kelvin).await,

        Commands::Identify { cycles } => {
            for ip in &ips {
                println!("Identifying {}...", ip);
                controller
                    .identify(*ip, cycles, Duration::from_millis(500))
                    .await;
            }
        }

        Commands::Rave {
            interval,
            duration,
            palette,
        } => {
            let names: Vec<String> = NamedColor::all().iter().map(|c| c.as_ref().to_string()).collect();
            let presets: Vec<String> = TemperaturePreset::all()
                .iter()
                .map(|p| p.as_ref().to_string())
                .collect();
            println!("Known colors: {}", names.join(", "));
            println!("(White presets such as {} are not used by rave.)", presets.join(", "));

            controller
                .start_effect(&ips, interval, &palette)
                .await;
            println!("Rave mode ON for {}s", duration);
            tokio::time::sleep(Duration::from_secs(duration)).await;
            controller.stop_effect().await;
            println!("Rave mode stopped.");
        }
    }

    if let Some(err) = controller.history().last_error() {
        eprintln!("Last error: {}", err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_rejects_negative_and_nan() {
        assert_eq!(parse_seconds("0.25"), Ok(Duration::from_millis(250)));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("NaN").is_err());
        assert!(parse_seconds("inf").is_err());
        assert!(parse_seconds("soon").is_err());
    }

    #[test]
    fn test_negative_interval_is_a_usage_error() {
        let parsed = Cli::try_parse_from(["wiz-cli", "--ip", "10.0.0.2", "rave", "--interval=-0.5"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from(["wiz-cli", "--reply-timeout", "0.5", "status"]).unwrap();
        assert_eq!(cli.reply_timeout, Duration::from_millis(500));
    }
}
