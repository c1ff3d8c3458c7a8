// src/common/error.rs

use reqwest::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Tudo que as views mostram ao usuário passa por aqui.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // A requisição nem chegou a completar (DNS, conexão recusada, timeout...)
    #[error("Falha de rede: {0}")]
    NetworkError(#[from] reqwest::Error),

    // O serviço respondeu, mas com um status fora de 2xx.
    // O 401 é tratado à parte pela camada de requisição autenticada.
    #[error("O serviço respondeu {status}: {message}")]
    HttpError { status: StatusCode, message: String },

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    // A renovação do token falhou; a sessão foi destruída.
    // Guarda o status original (o 401 que disparou a renovação).
    #[error("Sessão expirada (HTTP {original_status}), faça login novamente")]
    AuthExpired { original_status: StatusCode },

    #[error("Sessão ainda não inicializada")]
    SessionNotInitialized,

    // A view foi desmontada antes da resposta chegar.
    #[error("Requisição cancelada")]
    Cancelled,

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Detalhes de validação por campo, no mesmo formato que o restante
    /// da aplicação mostra (campo -> lista de mensagens).
    pub fn validation_details(&self) -> Option<HashMap<String, Vec<String>>> {
        let AppError::ValidationError(errors) = self else {
            return None;
        };
        let mut details = HashMap::new();
        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            details.insert(field.to_string(), messages);
        }
        Some(details)
    }

    /// Mensagem pronta para a view renderizar inline.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => {
                let mut parts = Vec::new();
                if let Some(details) = self.validation_details() {
                    let mut fields: Vec<_> = details.into_iter().collect();
                    fields.sort_by(|a, b| a.0.cmp(&b.0));
                    for (field, messages) in fields {
                        for message in messages {
                            parts.push(format!("{}: {}", field, message));
                        }
                    }
                }
                if parts.is_empty() {
                    "Um ou mais campos são inválidos.".to_string()
                } else {
                    parts.join("; ")
                }
            }
            other => other.to_string(),
        }
    }
}
