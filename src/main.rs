//! # Static HTTP Server - Entry Point
//! src/main.rs
//!
//! Carga la configuración (archivo + overrides de CLI/entorno), abre el
//! socket y atiende conexiones hasta que el proceso termina.

use clap::Parser;
use static_http::config::{Cli, ServerConfig};
use static_http::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuración inválida");
            std::process::exit(1);
        }
    };

    tracing::info!("static_http v{} iniciando", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "no se pudo abrir el socket");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}
