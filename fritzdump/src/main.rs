//! Print every value the gateway exposes through its get-only actions.
//!
//! Usage: `fritzdump [config_dir]`

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use fritzconfig::Config;
use fritzupnp::{Action, Connection, Root};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_dir = env::args().nth(1).unwrap_or_default();
    let config = Config::load_config(&config_dir).context("Failed to load configuration")?;

    init_tracing(&config.get_log_min_level());

    let address = config.get_gateway_address();
    let port = config.get_gateway_port();
    info!(address = %address, port, "Discovering gateway");

    let connection = Connection::new(
        &address,
        port,
        &config.get_username(),
        &config.get_password(),
    )
    .with_timeout(config.get_http_timeout());

    let root = Root::discover(Arc::new(connection))
        .with_context(|| format!("Could not load UPnP services from {}:{}", address, port))?;

    println!(
        "{} ({} services)",
        root.device().friendly_name,
        root.services().len()
    );

    for service_type in root.service_types() {
        let Some(service) = root.service(service_type) else {
            continue;
        };
        let actions = service.get_only_actions();
        if actions.is_empty() {
            continue;
        }

        println!("{}", service_type);
        for action in actions {
            print_action(action);
        }
    }

    Ok(())
}

fn print_action(action: &Action) {
    let result = match action.call() {
        Ok(result) => result,
        Err(err) => {
            warn!(action = %action.name, error = %err, "Unexpected error calling action");
            return;
        }
    };

    println!("  {}", action.name);
    for argument in &action.arguments {
        let Some(variable) = &argument.state_variable else {
            continue;
        };
        if let Some(value) = result.get(&variable.name) {
            println!("    {}: {}", argument.related_state_variable, value);
        }
    }
}

/// Log to stderr at the configured level; `RUST_LOG` takes precedence.
fn init_tracing(min_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(min_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
