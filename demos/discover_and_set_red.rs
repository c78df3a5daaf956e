//! Discover all Wiz lights on the network and set them to red.
//!
//! This example demonstrates:
//! - Discovery of Wiz bulbs on the local /24
//! - Setting all discovered lights to red color
//!
//! Run with: cargo run --example discover_and_set_red

use wiz_rave::{Controller, ControllerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Discovering Wiz lights on the network...");

    let controller = Controller::new(ControllerConfig::default());
    let bulbs = controller.discover().await?;

    if bulbs.is_empty() {
        println!("No lights found on the network.");
        return Ok(());
    }

    println!("Found {} light(s):", bulbs.len());
    for ip in &bulbs {
        let mac = controller
            .status_of(*ip)
            .and_then(|s| s.mac().map(String::from))
            .unwrap_or_else(|| "unknown".into());
        println!("  - IP: {}, MAC: {}", ip, mac);
    }

    println!("\nSetting all lights to red...");
    controller.set_color(&bulbs, "red").await;

    let summary = controller.history().summary();
    println!(
        "\nDone! {} request(s) sent, {} reply(ies), {} error(s).",
        summary.send_count, summary.receive_count, summary.error_count
    );
    Ok(())
}
