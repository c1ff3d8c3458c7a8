// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Papéis de realm embutidos no token ("realm_access.roles").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

// Estrutura de dados ("claims") dentro do access token.
// O provedor de identidade assina o token; quem valida a assinatura são os
// serviços remotos. Aqui só lemos os atributos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário, usado como clientId das commands)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,

    #[serde(default)]
    pub realm_access: Option<RealmAccess>,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp as i64, 0).unwrap_or_else(Utc::now)
    }

    pub fn roles(&self) -> &[String] {
        self.realm_access
            .as_ref()
            .map(|ra| ra.roles.as_slice())
            .unwrap_or(&[])
    }
}

// Resposta do endpoint de token do provedor (password e refresh grant).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// O par de tokens vivo da sessão.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Quantos segundos faltam para o access token expirar (pode ser negativo).
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

// A sessão autenticada: tokens + claims decodificadas.
// Pertence exclusivamente ao SessionHandle; só o cliente de identidade e o
// caminho de refresh da camada de requisição a modificam.
#[derive(Debug, Clone)]
pub struct Session {
    pub tokens: TokenSet,
    pub claims: Claims,
}

// Perfil mostrado na view de perfil, montado a partir das claims.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<&Session> for UserProfile {
    fn from(session: &Session) -> Self {
        let claims = &session.claims;
        let username = claims
            .preferred_username
            .clone()
            .unwrap_or_else(|| "N/A".to_string());
        Self {
            id: claims.sub,
            name: claims
                .name
                .clone()
                .or_else(|| claims.preferred_username.clone())
                .unwrap_or_else(|| "Usuário".to_string()),
            email: claims.email.clone().unwrap_or_else(|| "N/A".to_string()),
            username,
            roles: claims.roles().to_vec(),
        }
    }
}
