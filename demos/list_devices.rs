//! Print every location, gateway and device on a Hilo account, with the
//! latest attribute readings.
//!
//! ```sh
//! HILO_USERNAME=me@example.com HILO_PASSWORD=... RUST_LOG=hilo=debug \
//!     cargo run --example list_devices
//! ```

use anyhow::{Context, Result};
use hilo::HiloClient;
use log::info;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let username = env::var("HILO_USERNAME").context("HILO_USERNAME is not set")?;
    let password = env::var("HILO_PASSWORD").context("HILO_PASSWORD is not set")?;

    let client = HiloClient::new(&username, &password);

    info!("Authenticating with Hilo...");
    client.authenticate().await?;

    for location in client.locations().await? {
        println!("{} (#{}, {})", location.name, location.id, location.postal_code);

        for gateway in client.gateways(&location).await? {
            println!(
                "  gateway {} [{}] firmware {}",
                gateway.dsn, gateway.online_status, gateway.firmware_version
            );
        }

        for device in client.devices(&location).await? {
            println!("  {} - {} ({})", device.id, device.name, device.device_type);
            if device.disconnected {
                println!("    disconnected");
                continue;
            }

            let mut attributes: Vec<_> = client
                .device_attributes(&device)
                .await
                .with_context(|| format!("Failed to read attributes of device {}", device.id))?
                .into_iter()
                .collect();
            attributes.sort_by(|a, b| a.0.cmp(&b.0));

            for (name, attribute) in attributes {
                println!("    {}: {} {}", name, attribute.value, attribute.value_type);
            }
        }
    }

    Ok(())
}
