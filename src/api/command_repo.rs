// src/api/command_repo.rs

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    api::{client::ApiClient, endpoints::Endpoints},
    common::error::AppError,
    models::command::{Command, CreateCommandPayload},
};

// Repositório remoto de commands (pedidos). Só leitura e criação: o
// command-service não expõe update nem delete para o cliente.
#[derive(Clone)]
pub struct CommandRepository {
    api: ApiClient,
    endpoints: Endpoints,
}

impl CommandRepository {
    pub fn new(api: ApiClient, endpoints: Endpoints) -> Self {
        Self { api, endpoints }
    }

    /// Lista completa (visão de administração).
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<Command>, AppError> {
        self.api.get_json(&self.endpoints.commands(), cancel).await
    }

    pub async fn find_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Command, AppError> {
        self.api.get_json(&self.endpoints.command(id), cancel).await
    }

    /// "Minhas commands": as do subject do token.
    pub async fn list_by_client(
        &self,
        client_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Vec<Command>, AppError> {
        self.api
            .get_json(&self.endpoints.commands_by_client(client_id), cancel)
            .await
    }

    pub async fn create(
        &self,
        payload: &CreateCommandPayload,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| AppError::InternalError(e.into()))?;
        self.api
            .post_json(&self.endpoints.commands(), &body, cancel)
            .await
    }
}
