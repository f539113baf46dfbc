//! Inicialização do `tracing` para o binário. Logs vão para stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::WorkflowConfig;

/// Nível efetivo: `--verbose` força `debug`; senão o nível da configuração.
/// `RUST_LOG`, quando definido, prevalece sobre ambos.
pub fn log_level(config: &WorkflowConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    }
}

pub fn init_logging(config: &WorkflowConfig, verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| log_level(config, verbose)),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
