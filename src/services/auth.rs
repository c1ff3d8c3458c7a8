// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::{
    common::error::AppError,
    config::AppConfig,
    models::auth::{Claims, Session, TokenResponse, TokenSet},
    services::session::SessionHandle,
};

/// Cliente do provedor de identidade externo (endpoints OIDC do realm).
///
/// O fluxo de navegador (authorization code + PKCE) não tem análogo num
/// terminal; o login usa o direct-access grant contra o mesmo endpoint de
/// token. O resto da superfície consumida é igual: token, claims, refresh
/// com folga em segundos e logout.
#[derive(Clone)]
pub struct AuthService {
    http: reqwest::Client,
    token_url: String,
    logout_url: String,
    client_id: String,
    session: SessionHandle,
}

impl AuthService {
    pub fn new(config: &AppConfig, session: SessionHandle) -> Self {
        let realm_base = format!(
            "{}/realms/{}/protocol/openid-connect",
            config.keycloak_url.trim_end_matches('/'),
            config.realm
        );
        Self {
            http: reqwest::Client::new(),
            token_url: format!("{}/token", realm_base),
            logout_url: format!("{}/logout", realm_base),
            client_id: config.client_id.clone(),
            session,
        }
    }

    /// Autentica no realm e estabelece a sessão no handle injetado.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AppError> {
        let params = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("username", username),
            ("password", password),
            ("scope", "openid"),
        ];

        let resp = self.http.post(&self.token_url).form(&params).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::BAD_REQUEST
        {
            // invalid_grant: usuário ou senha errados
            return Err(AppError::InvalidCredentials);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AppError::HttpError { status, message });
        }

        let tokens: TokenResponse = resp.json().await?;
        let claims = decode_claims(&tokens.access_token)?;
        let session = Session {
            tokens: TokenSet {
                expires_at: claims.expires_at(),
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            claims,
        };
        self.session.establish(session);
        Ok(())
    }

    /// Renova o access token SE ele expira dentro de `leeway_secs` segundos
    /// (semântica do updateToken do provedor). Devolve se houve renovação.
    ///
    /// Em caso de falha devolve o erro e não mexe na sessão; quem decide
    /// derrubar tudo é o chamador (a camada de requisição).
    pub async fn update_token(&self, leeway_secs: i64) -> Result<bool, AppError> {
        let snapshot = self.session.snapshot();
        let Some(session) = snapshot.session() else {
            return Err(AppError::SessionNotInitialized);
        };

        if session.tokens.seconds_until_expiry(Utc::now()) > leeway_secs {
            // Ainda válido além da folga: nada a fazer.
            return Ok(false);
        }

        let Some(refresh_token) = session.tokens.refresh_token.as_deref() else {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "sessão sem refresh token"
            )));
        };

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ];
        let resp = self.http.post(&self.token_url).form(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AppError::HttpError { status, message });
        }

        let tokens: TokenResponse = resp.json().await?;
        let claims = decode_claims(&tokens.access_token)?;
        let token_set = TokenSet {
            expires_at: claims.expires_at(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        };
        self.session.replace_tokens(token_set, claims);
        tracing::debug!("🔄 Token renovado");
        Ok(true)
    }

    /// Encerra a sessão: avisa o provedor (melhor esforço) e destrói o
    /// estado local. Nunca falha para o chamador.
    pub async fn logout(&self) {
        let snapshot = self.session.snapshot();
        if let Some(refresh_token) = snapshot
            .session()
            .and_then(|s| s.tokens.refresh_token.as_deref())
        {
            let params = [
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
            ];
            if let Err(err) = self.http.post(&self.logout_url).form(&params).send().await {
                tracing::warn!("Logout no provedor falhou (ignorado): {}", err);
            }
        }
        self.session.teardown();
        tracing::info!("👋 Sessão encerrada.");
    }
}

/// Decodifica as claims do access token.
///
/// A assinatura NÃO é verificada aqui: o token vai direto para os serviços,
/// que validam com a chave pública do realm. A expiração também não é
/// imposta na decodificação, ela alimenta a folga do refresh.
fn decode_claims(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
