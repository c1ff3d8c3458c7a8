// src/config.rs

use std::env;

use crate::{
    api::{ApiClient, CommandRepository, Endpoints, ProductRepository},
    services::{auth::AuthService, session::SessionHandle},
};

// Configuração carregada do ambiente (com os mesmos defaults de
// desenvolvimento dos serviços).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub keycloak_url: String,
    pub realm: String,
    pub client_id: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // O .env é opcional; sem ele valem os defaults de desenvolvimento.
        dotenvy::dotenv().ok();

        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8888".to_string()),
            keycloak_url: env::var("KEYCLOAK_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            realm: env::var("KEYCLOAK_REALM").unwrap_or_else(|_| "loja".to_string()),
            client_id: env::var("KEYCLOAK_CLIENT_ID")
                .unwrap_or_else(|_| "loja-client".to_string()),
        }
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: SessionHandle,
    pub auth: AuthService,
    pub products: ProductRepository,
    pub commands: CommandRepository,
}

impl AppState {
    /// Monta o grafo de dependências inteiro a partir da configuração e da
    /// sessão já inicializada no main (injeção explícita, sem singletons).
    pub fn new(config: AppConfig, session: SessionHandle, auth: AuthService) -> Self {
        let api = ApiClient::new(session.clone(), auth.clone());
        let endpoints = Endpoints::new(&config.api_base_url);
        let products = ProductRepository::new(api.clone(), endpoints.clone());
        let commands = CommandRepository::new(api, endpoints);

        Self {
            config,
            session,
            auth,
            products,
            commands,
        }
    }
}
