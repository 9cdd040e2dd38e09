//! # lifxctl
//!
//! Composition root: the only crate that knows about *all* layers.
//!
//! ## Responsibilities
//! - Parse the command line and load configuration
//! - Initialise tracing (to stderr, so stdout stays the user-facing report)
//! - Instantiate adapters (JSON registry file, LIFX LAN transport)
//! - Inject them into the application services and run the selected action
//!
//! ## Exit status
//! Per-command failures are reported on stdout and still exit successfully.
//! Anything unexpected (unreadable config or registry, failed broadcast)
//! prints `Unexpected error: ...` and exits with a failure status.

mod cli;
mod config;
mod output;
mod prompt;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use lifxctl_adapter_lifx_lan::LanTransport;
use lifxctl_adapter_storage_json::JsonFileStore;
use lifxctl_app::retry::RetryExecutor;
use lifxctl_app::services::command_engine::CommandEngine;
use lifxctl_app::services::device_registry::DeviceRegistry;
use lifxctl_app::services::discovery::DiscoveryService;
use lifxctl_app::verified::VerifiedOperations;
use lifxctl_domain::error::LifxCtlError;

use crate::cli::{Action, Cli};
use crate::config::Config;
use crate::prompt::PromptResolver;

type Registry = DeviceRegistry<JsonFileStore>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(action) = cli.action() else {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    match run(cli.config.as_deref(), action).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("Unexpected error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: Option<&Path>, action: Action) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("cannot load configuration")?;
    init_tracing(&config.logging.filter);

    tracing::debug!(registry = %config.registry.path.display(), "loading device registry");
    let store = JsonFileStore::new(&config.registry.path);
    let mut registry = DeviceRegistry::load(store)
        .await
        .context("cannot load device registry")?;

    match action {
        Action::Discover => discover(&config, &mut registry).await,
        Action::SaveDevice { ip, mac, name } => save_device(&mut registry, &ip, &mac, &name).await,
        Action::List => {
            print!("{}", output::device_table(registry.list()));
            Ok(())
        }
        Action::Command { name, verb, args } => {
            let transport = LanTransport::new(config.transport.clone());
            let operations = VerifiedOperations::new(
                RetryExecutor::new(config.retry_policy()),
                config.verification_policy(),
            );
            let mut engine = CommandEngine::new(registry, transport, operations);
            let outcome = engine.execute_raw(&name, &verb, &args).await;
            print!("{}", output::command_report(&outcome));
            Ok(())
        }
    }
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn discover(config: &Config, registry: &mut Registry) -> anyhow::Result<()> {
    println!("Discovering LIFX devices...");

    let service = DiscoveryService::new(LanTransport::new(config.transport.clone()));
    let mut resolver = PromptResolver::stdio();
    let report = service.discover(registry, &mut resolver).await?;

    println!();
    for device in &report.added {
        println!("Device '{}' added to configuration.", device.name);
    }
    for (light, err) in &report.rejected {
        println!("Error: {err} (device {} at {})", light.id, light.address);
    }
    tracing::info!(
        added = report.added.len(),
        already_known = report.already_known,
        skipped = report.skipped,
        rejected = report.rejected.len(),
        "discovery finished"
    );
    println!("\nDevice discovery complete.");
    Ok(())
}

async fn save_device(
    registry: &mut Registry,
    ip: &str,
    mac: &str,
    name: &str,
) -> anyhow::Result<()> {
    match registry.add(mac, name, ip).await {
        Ok(device) => {
            println!(
                "Device '{}' saved successfully with IP: {} and MAC: {}",
                device.name, device.address, device.id
            );
            Ok(())
        }
        Err(err @ (LifxCtlError::Validation(_) | LifxCtlError::DuplicateName(_))) => {
            println!("Error: {err}");
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err).context("cannot save device")),
    }
}
