// src/api/client.rs

use reqwest::{
    Method, StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    common::error::AppError,
    services::{auth::AuthService, session::SessionHandle},
};

// Folga, em segundos, pedida ao provedor na renovação disparada por um 401.
pub const TOKEN_REFRESH_LEEWAY_SECS: i64 = 30;

/// Camada de requisição autenticada.
///
/// Anexa `Authorization: Bearer <token>` quando há sessão, e num 401 com
/// sessão viva tenta UMA renovação de token seguida de UMA repetição da
/// chamada. Se a renovação falhar, derruba a sessão (logout) e devolve o
/// 401 original como `AuthExpired`. Nenhuma outra repetição automática.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    session: SessionHandle,
    auth: AuthService,
}

impl ApiClient {
    pub fn new(session: SessionHandle, auth: AuthService) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
            auth,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.session.access_token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(header::AUTHORIZATION, value);
            }
        }
        headers
    }

    // Uma tentativa única, abortável pelo token de cancelamento da view.
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, AppError> {
        let mut builder = self.http.request(method.clone(), url).headers(self.headers());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            result = builder.send() => Ok(result?),
        }
    }

    /// Executa a chamada com o algoritmo renovar-e-repetir do 401.
    /// Respostas fora de 2xx (menos o 401 tratado) voltam para o chamador.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, AppError> {
        let resp = self.send_once(&method, url, body, cancel).await?;

        if resp.status() == StatusCode::UNAUTHORIZED && self.session.is_authenticated() {
            let original_status = resp.status();
            return match self.auth.update_token(TOKEN_REFRESH_LEEWAY_SECS).await {
                // Renovou (ou o token ainda valia): repete exatamente uma vez.
                Ok(_) => self.send_once(&method, url, body, cancel).await,
                Err(err) => {
                    tracing::warn!("Falha ao renovar o token: {}", err);
                    self.auth.logout().await;
                    Err(AppError::AuthExpired { original_status })
                }
            };
        }

        Ok(resp)
    }

    // --- Verbos de conveniência usados pelos repositórios ---

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<T, AppError> {
        let resp = self.request(Method::GET, url, None, cancel).await?;
        Ok(expect_success(resp).await?.json().await?)
    }

    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let resp = self.request(Method::POST, url, Some(body), cancel).await?;
        expect_success(resp).await?;
        Ok(())
    }

    pub async fn put_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let resp = self.request(Method::PUT, url, Some(body), cancel).await?;
        expect_success(resp).await?;
        Ok(())
    }

    pub async fn delete(&self, url: &str, cancel: &CancellationToken) -> Result<(), AppError> {
        let resp = self.request(Method::DELETE, url, None, cancel).await?;
        expect_success(resp).await?;
        Ok(())
    }
}

// Converte respostas fora de 2xx em HttpError, aproveitando o campo
// "message" do corpo quando o serviço manda um.
async fn expect_success(resp: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or(text);
    Err(AppError::HttpError { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::auth::{Claims, RealmAccess, Session, TokenSet};
    use axum::{Json, Router, http::StatusCode as AxStatus, response::IntoResponse, routing};
    use chrono::Utc;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use serde_json::json;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use uuid::Uuid;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn signed_token(exp: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: exp as usize,
            iat: 1_000_000_000,
            name: None,
            preferred_username: Some("aline".to_string()),
            email: None,
            given_name: None,
            family_name: None,
            realm_access: Some(RealmAccess {
                roles: vec!["client".to_string()],
            }),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"segredo-de-teste"),
        )
        .unwrap()
    }

    // Sessão com access token já vencido, para o update_token renovar de fato.
    fn stale_session() -> Session {
        let exp = Utc::now().timestamp() - 10;
        Session {
            tokens: TokenSet {
                access_token: "token-velho".to_string(),
                refresh_token: Some("refresh-velho".to_string()),
                expires_at: Utc::now() - chrono::Duration::seconds(10),
            },
            claims: Claims {
                sub: Uuid::new_v4(),
                exp: exp as usize,
                iat: 1_000_000_000,
                name: None,
                preferred_username: None,
                email: None,
                given_name: None,
                family_name: None,
                realm_access: None,
            },
        }
    }

    // Provedor stub: conta renovações e logouts.
    fn identity_stub(
        refreshes: Arc<AtomicUsize>,
        logouts: Arc<AtomicUsize>,
        refresh_fails: bool,
    ) -> Router {
        let token_route = routing::post(move || {
            let refreshes = refreshes.clone();
            async move {
                refreshes.fetch_add(1, Ordering::SeqCst);
                if refresh_fails {
                    (AxStatus::BAD_REQUEST, Json(json!({"error": "invalid_grant"})))
                        .into_response()
                } else {
                    let token = signed_token(Utc::now().timestamp() + 300);
                    Json(json!({"access_token": token, "refresh_token": "refresh-novo"}))
                        .into_response()
                }
            }
        });
        let logout_route = routing::post(move || {
            let logouts = logouts.clone();
            async move {
                logouts.fetch_add(1, Ordering::SeqCst);
                AxStatus::NO_CONTENT.into_response()
            }
        });
        Router::new()
            .route("/realms/loja/protocol/openid-connect/token", token_route)
            .route("/realms/loja/protocol/openid-connect/logout", logout_route)
    }

    // Serviço stub: 401 na primeira chamada, 200 depois.
    fn flaky_products_stub(hits: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/product-service/products",
            routing::get(move || {
                let hits = hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        (AxStatus::UNAUTHORIZED, Json(json!({"error": "expired"})))
                            .into_response()
                    } else {
                        Json(json!([
                            {"id": "1", "name": "Widget", "description": null,
                             "price": 9.99, "quantity": 10}
                        ]))
                        .into_response()
                    }
                }
            }),
        )
    }

    fn client_against(keycloak_url: &str) -> (ApiClient, SessionHandle) {
        let config = AppConfig {
            api_base_url: "http://ignorado".to_string(),
            keycloak_url: keycloak_url.to_string(),
            realm: "loja".to_string(),
            client_id: "loja-client".to_string(),
        };
        let session = SessionHandle::new();
        session.mark_initialized();
        let auth = AuthService::new(&config, session.clone());
        (ApiClient::new(session.clone(), auth), session)
    }

    #[tokio::test]
    async fn a_401_is_retried_once_after_exactly_one_refresh() {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let logouts = Arc::new(AtomicUsize::new(0));
        let hits = Arc::new(AtomicUsize::new(0));

        let idp = spawn(identity_stub(refreshes.clone(), logouts.clone(), false)).await;
        let svc = spawn(flaky_products_stub(hits.clone())).await;

        let (client, session) = client_against(&idp);
        session.establish(stale_session());

        let cancel = CancellationToken::new();
        let url = format!("{}/product-service/products", svc);
        let resp = client
            .request(Method::GET, &url, None, &cancel)
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn a_failed_refresh_logs_out_once_and_surfaces_the_original_401() {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let logouts = Arc::new(AtomicUsize::new(0));
        let hits = Arc::new(AtomicUsize::new(0));

        let idp = spawn(identity_stub(refreshes.clone(), logouts.clone(), true)).await;
        let svc = spawn(flaky_products_stub(hits.clone())).await;

        let (client, session) = client_against(&idp);
        session.establish(stale_session());

        let cancel = CancellationToken::new();
        let url = format!("{}/product-service/products", svc);
        let err = client
            .request(Method::GET, &url, None, &cancel)
            .await
            .unwrap_err();

        match err {
            AppError::AuthExpired { original_status } => {
                assert_eq!(original_status, StatusCode::UNAUTHORIZED);
            }
            other => panic!("erro inesperado: {:?}", other),
        }
        // Logout uma única vez, sessão destruída, chamada não repetida.
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn the_bearer_header_is_attached_only_when_a_session_exists() {
        let app = Router::new().route(
            "/echo",
            routing::get(|headers: axum::http::HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                Json(json!({"authorization": auth}))
            }),
        );
        let svc = spawn(app).await;

        let (client, session) = client_against("http://127.0.0.1:1");
        let cancel = CancellationToken::new();
        let url = format!("{}/echo", svc);

        // Sem sessão: sem header.
        let body: serde_json::Value = client.get_json(&url, &cancel).await.unwrap();
        assert_eq!(body["authorization"], "");

        // Com sessão: Bearer <token>.
        let mut s = stale_session();
        s.tokens.access_token = "tok-123".to_string();
        session.establish(s);
        let body: serde_json::Value = client.get_json(&url, &cancel).await.unwrap();
        assert_eq!(body["authorization"], "Bearer tok-123");
    }

    #[tokio::test]
    async fn a_cancelled_view_aborts_the_request() {
        let (client, _session) = client_against("http://127.0.0.1:1");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .request(Method::GET, "http://127.0.0.1:1/nunca", None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
    }

    #[tokio::test]
    async fn non_2xx_bodies_become_http_errors_with_the_service_message() {
        let app = Router::new().route(
            "/product-service/products",
            routing::post(|| async {
                (
                    AxStatus::CONFLICT,
                    Json(json!({"message": "SKU duplicado"})),
                )
            }),
        );
        let svc = spawn(app).await;

        let (client, _session) = client_against("http://127.0.0.1:1");
        let cancel = CancellationToken::new();
        let url = format!("{}/product-service/products", svc);

        let err = client.post_json(&url, &json!({}), &cancel).await.unwrap_err();
        match err {
            AppError::HttpError { status, message } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(message, "SKU duplicado");
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }
}
