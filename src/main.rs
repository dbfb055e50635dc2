//! steamnerd - runs the module host against the console transport.

use std::path::Path;
use std::sync::Arc;

use steamnerd::builtin;
use steamnerd::config::{self, Config};
use steamnerd::host::HostBuilder;
use steamnerd::network::console::{self, ConsoleOutbound};
use steamnerd::scripting::TomlScriptLoader;
use steamnerd::state::UserDirectory;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "steamnerd.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing. Stdout carries console output, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var_os("STEAMNERD_LOG_JSON").is_some() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration
    let explicit = std::env::args().nth(1);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = if explicit.is_none() && !Path::new(&config_path).exists() {
        warn!(path = %config_path, "Config file not found, using defaults");
        Config::default()
    } else {
        Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?
    };

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        name = %config.bot.name,
        command_char = %config.bot.command_char,
        "Starting SteamNerd"
    );

    // The admin list must load; permission checks depend on it.
    let users = UserDirectory::load(&config.admins.path).map_err(|e| {
        error!(
            path = %config.admins.path.display(),
            code = e.error_code(),
            error = %e,
            "Failed to load admin list"
        );
        e
    })?;
    info!(admins = users.admins().len(), "Loaded admin list");

    let mut builder = HostBuilder::from_config(
        &config,
        Arc::new(ConsoleOutbound::stdout()),
        Arc::new(users),
    );

    for entry in &config.modules.builtin {
        let Some(scope) = entry.scope.scope() else {
            continue;
        };
        match builtin::create(&entry.name, scope) {
            Some(Ok(module)) => builder.add_module(module),
            Some(Err(e)) => error!(module = %entry.name, error = %e, "Failed to build module"),
            None => warn!(module = %entry.name, "Unknown builtin module"),
        }
    }

    let scripts: Vec<_> = config
        .modules
        .script
        .iter()
        .filter_map(|entry| Some((entry.path.as_path(), entry.scope.scope()?)))
        .collect();
    let failures = builder.load_scripts(&TomlScriptLoader, scripts);
    if !failures.is_empty() {
        warn!(failed = failures.len(), "Some scripted modules were not loaded");
    }

    let host = builder.build();
    host.start().await;

    info!("Reading events from stdin");
    console::run(&host, tokio::io::stdin()).await?;

    info!("Shutdown complete");
    Ok(())
}
