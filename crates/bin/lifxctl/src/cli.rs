//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Control LIFX bulbs on the local network by name.
#[derive(Debug, Parser)]
#[command(name = "lifxctl", version, about, long_about = None)]
pub struct Cli {
    /// Discover and configure new devices.
    #[arg(long)]
    pub discover: bool,

    /// Manually save a device with IP, MAC address, and name.
    #[arg(long, num_args = 3, value_names = ["IP", "MAC", "NAME"])]
    pub save_device: Option<Vec<String>>,

    /// List all configured devices.
    #[arg(long)]
    pub list: bool,

    /// Device name to control.
    #[arg(long)]
    pub name: Option<String>,

    /// Command to execute (on, off, setBrightness, setColor, status).
    #[arg(long)]
    pub command: Option<String>,

    /// Additional arguments for the command.
    #[arg(long, num_args = 0.., allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Configuration file [default: lifxctl.toml, if present].
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What one invocation does.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Discover,
    SaveDevice {
        ip: String,
        mac: String,
        name: String,
    },
    List,
    Command {
        name: String,
        verb: String,
        args: Vec<String>,
    },
}

impl Cli {
    /// The selected action; the first flag wins, in the order of the help text.
    /// `None` means help should be printed.
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        if self.discover {
            return Some(Action::Discover);
        }
        if let Some([ip, mac, name]) = self.save_device.as_deref() {
            return Some(Action::SaveDevice {
                ip: ip.clone(),
                mac: mac.clone(),
                name: name.clone(),
            });
        }
        if self.list {
            return Some(Action::List);
        }
        match (&self.name, &self.command) {
            (Some(name), Some(verb)) => Some(Action::Command {
                name: name.clone(),
                verb: verb.clone(),
                args: self.args.clone(),
            }),
            _ => None,
        }
    }
}
