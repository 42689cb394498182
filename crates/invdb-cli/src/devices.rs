//! `list` and `delete` command handlers.

use invdb_client::DevicesClient;
use invdb_core::Device;

/// Print every stored device as a table.
///
/// # Errors
///
/// Returns an error if the devices API request fails.
pub(crate) async fn run_list(client: &DevicesClient) -> anyhow::Result<()> {
    let devices = client.list_devices().await?;

    if devices.is_empty() {
        println!("no devices found; run `import` first");
        return Ok(());
    }

    println!(
        "{:<12}{:<10}{:<16}{:<10}{:>10}  {:<10}LAST USED",
        "TYPE", "ID", "LOCATION", "HEALTH", "PRICE", "COLOR"
    );
    for device in &devices {
        println!("{}", format_device_row(device));
    }
    println!("{} devices", devices.len());

    Ok(())
}

/// Delete the device stored under `device_type`/`id`.
///
/// # Errors
///
/// Returns an error if the devices API rejects the request.
pub(crate) async fn run_delete(
    client: &DevicesClient,
    device_type: &str,
    id: &str,
) -> anyhow::Result<()> {
    client.delete_device(device_type, id).await?;
    tracing::info!(device_type, id, "device deleted");
    println!("deleted {device_type}/{id}");
    Ok(())
}

pub(crate) fn format_device_row(device: &Device) -> String {
    let dash = || "-".to_string();
    let location = device.location.clone().unwrap_or_else(dash);
    let location = if location.chars().count() > 15 {
        format!("{}...", location.chars().take(12).collect::<String>())
    } else {
        location
    };

    format!(
        "{:<12}{:<10}{:<16}{:<10}{:>10}  {:<10}{}",
        device.primary_key(),
        device.secondary_key(),
        location,
        device.health.map_or_else(dash, |h| h.to_string()),
        format!("{:.2}", device.price),
        device.color.clone().unwrap_or_else(dash),
        device.last_used.format("%Y-%m-%d %H:%M"),
    )
}
