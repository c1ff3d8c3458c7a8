// src/main.rs

// Declaração dos nossos módulos
mod api;
mod common;
mod config;
mod middleware;
mod models;
mod services;
mod shell;
mod views;

use crate::config::{AppConfig, AppState};
use crate::services::{auth::AuthService, session::SessionHandle};
use crate::shell::Shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG controla o nível).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env();
    tracing::info!("🛒 Cliente da loja apontado para {}", config.api_base_url);
    tracing::info!(
        "🔑 Provedor de identidade: {} (realm {})",
        config.keycloak_url,
        config.realm
    );

    // A sessão é construída UMA vez aqui e injetada em quem precisa.
    // Nada de singleton escondido: init explícito, teardown no logout.
    let session = SessionHandle::new();
    let auth = AuthService::new(&config, session.clone());
    session.mark_initialized();

    let state = AppState::new(config, session, auth);
    Shell::new(state).run().await?;

    Ok(())
}
