//! Text rendering of registry listings and command outcomes.

use lifxctl_app::services::command_engine::CommandOutcome;
use lifxctl_domain::command::DeviceStatus;
use lifxctl_domain::device::DeviceRecord;

const RULE_WIDTH: usize = 60;

/// Printed after failures that re-running discovery may fix.
pub const REDISCOVERY_HINT: &str =
    "Try running the discovery process again to update device information:\n  lifxctl --discover";

/// Table of registered devices, or a notice when there are none.
#[must_use]
pub fn device_table(devices: &[DeviceRecord]) -> String {
    if devices.is_empty() {
        return "No devices configured.\n".to_string();
    }

    let rule = "-".repeat(RULE_WIDTH);
    let mut out = format!(
        "\nConfigured Devices:\n{rule}\n{}\n{rule}\n",
        table_row("Name", "IP Address", "MAC Address")
    );
    for device in devices {
        out.push_str(&table_row(
            &device.name,
            &device.address.to_string(),
            &device.id.to_string(),
        ));
        out.push('\n');
    }
    out
}

fn table_row(name: &str, address: &str, mac: &str) -> String {
    format!("{name:<20} {address:<15} {mac:<17}")
}

/// User-facing report of one command.
#[must_use]
pub fn command_report(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Succeeded {
            device,
            command,
            status,
        } => {
            let status = status
                .as_ref()
                .map(|status| status_report(&device.name, status))
                .unwrap_or_default();
            format!(
                "{status}Command '{command}' executed successfully on '{}'\n",
                device.name
            )
        }
        CommandOutcome::NotFound { name } => {
            format!("Device '{name}' not found in configuration.\n")
        }
        CommandOutcome::Failed { error, .. } if error.suggests_rediscovery() => {
            format!("Error: {error}\n{REDISCOVERY_HINT}\n")
        }
        CommandOutcome::Failed { error, .. } => format!("Error: {error}\n"),
    }
}

fn status_report(name: &str, status: &DeviceStatus) -> String {
    let color = status.color;
    format!(
        "\nStatus for {name}:\nPower: {}\nColor:\n  Hue: {}\n  Saturation: {}\n  Brightness: {}\n  Kelvin: {}\n",
        if status.power { "ON" } else { "OFF" },
        color.hue,
        color.saturation,
        color.brightness,
        color.kelvin,
    )
}
