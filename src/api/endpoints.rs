// src/api/endpoints.rs

use uuid::Uuid;

// Mapa centralizado dos endpoints consumidos, montado a partir da base
// configurável. Única fonte de verdade das URLs dos dois serviços.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    // --- product-service ---

    pub fn products(&self) -> String {
        format!("{}/product-service/products", self.base)
    }

    pub fn product(&self, id: &str) -> String {
        format!("{}/product-service/products/{}", self.base, id)
    }

    // --- command-service ---

    pub fn commands(&self) -> String {
        format!("{}/command-service/commands", self.base)
    }

    pub fn command(&self, id: &str) -> String {
        format!("{}/command-service/commands/{}", self.base, id)
    }

    pub fn commands_by_client(&self, client_id: Uuid) -> String {
        format!("{}/command-service/commands/client/{}", self.base, client_id)
    }
}
