// src/api/product_repo.rs

use tokio_util::sync::CancellationToken;

use crate::{
    api::{client::ApiClient, endpoints::Endpoints},
    common::error::AppError,
    models::product::{Product, ProductPayload},
};

// Repositório remoto de produtos: o dono dos dados é o product-service,
// aqui só traduzimos operações em chamadas REST autenticadas.
#[derive(Clone)]
pub struct ProductRepository {
    api: ApiClient,
    endpoints: Endpoints,
}

impl ProductRepository {
    pub fn new(api: ApiClient, endpoints: Endpoints) -> Self {
        Self { api, endpoints }
    }

    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<Product>, AppError> {
        self.api.get_json(&self.endpoints.products(), cancel).await
    }

    pub async fn find_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Product, AppError> {
        self.api.get_json(&self.endpoints.product(id), cancel).await
    }

    pub async fn create(
        &self,
        payload: &ProductPayload,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| AppError::InternalError(e.into()))?;
        self.api
            .post_json(&self.endpoints.products(), &body, cancel)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        payload: &ProductPayload,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| AppError::InternalError(e.into()))?;
        self.api
            .put_json(&self.endpoints.product(id), &body, cancel)
            .await
    }

    pub async fn delete(&self, id: &str, cancel: &CancellationToken) -> Result<(), AppError> {
        self.api.delete(&self.endpoints.product(id), cancel).await
    }
}
