// src/views/products.rs

use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::routes::Route,
    models::product::{Product, ProductPayload},
    services::roles::Role,
    views::state::{ViewState, absorb, format_money, print_error_with_retry},
};

// ---
// View: lista de produtos
// ---
pub struct ProductsListView {
    pub state: ViewState<Vec<Product>>,
    cancel: CancellationToken,
}

impl ProductsListView {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            state: ViewState::Idle,
            cancel,
        }
    }

    pub async fn load(&mut self, app: &AppState) -> Result<(), AppError> {
        self.state = ViewState::Loading;
        println!("⏳ Carregando produtos...");
        absorb(&mut self.state, app.products.list(&self.cancel).await)
    }

    pub fn render(&self, role: Role) {
        match &self.state {
            ViewState::Success(products) => {
                println!("== Lista de Produtos ==");
                if products.is_empty() {
                    println!("Nenhum produto disponível.");
                    if role == Role::Admin {
                        println!("Use 'new' para criar o primeiro produto.");
                    }
                    return;
                }
                for product in products {
                    println!(
                        "  [{}] {}  {}  (estoque: {})",
                        product.id,
                        product.name,
                        format_money(product.price),
                        product.quantity
                    );
                }
                match role {
                    Role::Admin => println!(
                        "Comandos: products <id> | new | edit <id> | delete <id>"
                    ),
                    Role::Client => println!(
                        "Somente administradores podem adicionar, editar ou remover produtos."
                    ),
                }
            }
            ViewState::Error(message) => print_error_with_retry(message),
            _ => {}
        }
    }

    /// Remove um produto. `confirmed == false` é um no-op explícito (o
    /// cancelamento da confirmação não é erro). No sucesso a lista local é
    /// atualizada de forma otimista, sem refetch.
    pub async fn delete(
        &mut self,
        app: &AppState,
        id: &str,
        confirmed: bool,
    ) -> Result<(), AppError> {
        if !confirmed {
            println!("Cancelado.");
            return Ok(());
        }
        match app.products.delete(id, &self.cancel).await {
            Ok(()) => {
                if let ViewState::Success(products) = &mut self.state {
                    products.retain(|p| p.id != id);
                }
                println!("🗑️  Produto removido.");
                Ok(())
            }
            Err(err @ (AppError::AuthExpired { .. } | AppError::Cancelled)) => Err(err),
            Err(err) => {
                println!("Erro ao remover: {}", err.user_message());
                Ok(())
            }
        }
    }
}

// ---
// View: detalhe de produto
// ---
pub struct ProductDetailView {
    pub id: String,
    pub state: ViewState<Product>,
    cancel: CancellationToken,
}

impl ProductDetailView {
    pub fn new(id: String, cancel: CancellationToken) -> Self {
        Self {
            id,
            state: ViewState::Idle,
            cancel,
        }
    }

    pub async fn load(&mut self, app: &AppState) -> Result<(), AppError> {
        self.state = ViewState::Loading;
        println!("⏳ Carregando produto...");
        absorb(
            &mut self.state,
            app.products.find_by_id(&self.id, &self.cancel).await,
        )
    }

    pub fn render(&self, role: Role) {
        match &self.state {
            ViewState::Success(product) => {
                println!("== {} ==", product.name);
                println!("  Preço: {}", format_money(product.price));
                println!(
                    "  Descrição: {}",
                    product
                        .description
                        .as_deref()
                        .unwrap_or("Nenhuma descrição disponível")
                );
                println!("  ID: {}", product.id);
                if product.quantity == 0 {
                    println!("  Estoque: 0 (esgotado)");
                } else {
                    println!("  Estoque: {}", product.quantity);
                }
                if role == Role::Admin {
                    println!("Comandos: edit {} | delete {}", product.id, product.id);
                } else {
                    println!("Somente administradores podem editar ou remover produtos.");
                }
            }
            ViewState::Error(message) => print_error_with_retry(message),
            _ => {}
        }
    }

    /// Remove o produto aberto; no sucesso a navegação volta para a lista.
    pub async fn delete(
        &mut self,
        app: &AppState,
        confirmed: bool,
    ) -> Result<Option<Route>, AppError> {
        if !confirmed {
            println!("Cancelado.");
            return Ok(None);
        }
        match app.products.delete(&self.id, &self.cancel).await {
            Ok(()) => {
                println!("🗑️  Produto removido.");
                Ok(Some(Route::Products))
            }
            Err(err @ (AppError::AuthExpired { .. } | AppError::Cancelled)) => Err(err),
            Err(err) => {
                println!("Erro ao remover: {}", err.user_message());
                Ok(None)
            }
        }
    }
}

// ---
// View: formulário de produto (criação e edição)
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

pub struct ProductFormView {
    pub mode: FormMode,
    // Na edição, o produto atual para pré-preencher o formulário.
    pub state: ViewState<Option<Product>>,
    cancel: CancellationToken,
}

impl ProductFormView {
    pub fn new(mode: FormMode, cancel: CancellationToken) -> Self {
        Self {
            mode,
            state: ViewState::Idle,
            cancel,
        }
    }

    pub async fn load(&mut self, app: &AppState) -> Result<(), AppError> {
        match self.mode.clone() {
            FormMode::Create => {
                self.state = ViewState::Success(None);
                Ok(())
            }
            FormMode::Edit(id) => {
                self.state = ViewState::Loading;
                println!("⏳ Carregando produto...");
                absorb(
                    &mut self.state,
                    app.products
                        .find_by_id(&id, &self.cancel)
                        .await
                        .map(Some),
                )
            }
        }
    }

    pub fn current(&self) -> Option<&Product> {
        self.state.success().and_then(|p| p.as_ref())
    }

    /// Valida e envia o formulário. Campos inválidos bloqueiam o submit
    /// antes de qualquer chamada de rede; no sucesso a navegação vai para a
    /// lista de produtos (sem patch local).
    pub async fn submit(
        &mut self,
        app: &AppState,
        payload: ProductPayload,
    ) -> Result<Option<Route>, AppError> {
        if let Err(errors) = payload.validate() {
            let err = AppError::ValidationError(errors);
            println!("⚠️  {}", err.user_message());
            return Ok(None);
        }

        let result = match &self.mode {
            FormMode::Create => app.products.create(&payload, &self.cancel).await,
            FormMode::Edit(id) => app.products.update(id, &payload, &self.cancel).await,
        };

        match result {
            Ok(()) => {
                match self.mode {
                    FormMode::Create => println!("✅ Produto criado."),
                    FormMode::Edit(_) => println!("✅ Produto atualizado."),
                }
                Ok(Some(Route::Products))
            }
            Err(err @ (AppError::AuthExpired { .. } | AppError::Cancelled)) => Err(err),
            Err(err) => {
                println!("Erro ao salvar: {}", err.user_message());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::auth::{Claims, Session, TokenSet};
    use crate::services::{auth::AuthService, session::SessionHandle};
    use axum::{Json, Router, extract::Path, http::StatusCode as AxStatus, routing};
    use chrono::Utc;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn app_state(api_base_url: &str) -> AppState {
        let config = AppConfig {
            api_base_url: api_base_url.to_string(),
            keycloak_url: "http://127.0.0.1:1".to_string(),
            realm: "loja".to_string(),
            client_id: "loja-client".to_string(),
        };
        let session = SessionHandle::new();
        session.mark_initialized();
        session.establish(Session {
            tokens: TokenSet {
                access_token: "token-valido".to_string(),
                refresh_token: None,
                expires_at: Utc::now() + chrono::Duration::hours(1),
            },
            claims: Claims {
                sub: Uuid::new_v4(),
                exp: (Utc::now().timestamp() + 3600) as usize,
                iat: 1_000_000_000,
                name: None,
                preferred_username: None,
                email: None,
                given_name: None,
                family_name: None,
                realm_access: None,
            },
        });
        let auth = AuthService::new(&config, session.clone());
        AppState::new(config, session, auth)
    }

    #[tokio::test]
    async fn creating_a_widget_posts_the_exact_body_and_navigates_to_products() {
        let seen = Arc::new(Mutex::new(None::<serde_json::Value>));
        let seen_clone = seen.clone();
        let stub = Router::new().route(
            "/product-service/products",
            routing::post(move |Json(body): Json<serde_json::Value>| {
                let seen = seen_clone.clone();
                async move {
                    *seen.lock().unwrap() = Some(body);
                    (AxStatus::CREATED, Json(json!({"id": "42"})))
                }
            }),
        );
        let base = spawn(stub).await;
        let app = app_state(&base);

        let mut view = ProductFormView::new(FormMode::Create, CancellationToken::new());
        view.load(&app).await.unwrap();

        let payload = ProductPayload {
            name: "Widget".to_string(),
            description: None,
            price: "9.99".parse().unwrap(),
            quantity: 10,
        };
        let nav = view.submit(&app, payload).await.unwrap();

        assert_eq!(nav, Some(Route::Products));
        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["name"], "Widget");
        assert_eq!(body["price"], 9.99);
        assert_eq!(body["quantity"], 10);
    }

    #[tokio::test]
    async fn an_invalid_form_never_reaches_the_network() {
        // Base de API inalcançável: o teste falharia se houvesse chamada.
        let app = app_state("http://127.0.0.1:1");

        let mut view = ProductFormView::new(FormMode::Create, CancellationToken::new());
        view.load(&app).await.unwrap();

        let payload = ProductPayload {
            name: String::new(),
            description: None,
            price: "1.00".parse().unwrap(),
            quantity: 1,
        };
        let nav = view.submit(&app, payload).await.unwrap();
        assert_eq!(nav, None);
    }

    #[tokio::test]
    async fn deleting_from_the_list_updates_it_optimistically() {
        let stub = Router::new().route(
            "/product-service/products/{id}",
            routing::delete(|Path(_id): Path<String>| async { AxStatus::NO_CONTENT }),
        );
        let base = spawn(stub).await;
        let app = app_state(&base);

        let mut view = ProductsListView::new(CancellationToken::new());
        view.state = ViewState::Success(vec![
            Product {
                id: "1".to_string(),
                name: "Widget".to_string(),
                description: None,
                price: "9.99".parse().unwrap(),
                quantity: 10,
            },
            Product {
                id: "2".to_string(),
                name: "Gadget".to_string(),
                description: None,
                price: "5.00".parse().unwrap(),
                quantity: 3,
            },
        ]);

        view.delete(&app, "1", true).await.unwrap();
        let remaining = view.state.success().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "2");
    }

    #[tokio::test]
    async fn an_unconfirmed_delete_is_a_noop() {
        // Nenhum stub no ar: um DELETE de verdade falharia na conexão.
        let app = app_state("http://127.0.0.1:1");
        let mut view = ProductsListView::new(CancellationToken::new());
        view.state = ViewState::Success(vec![Product {
            id: "1".to_string(),
            name: "Widget".to_string(),
            description: None,
            price: "9.99".parse().unwrap(),
            quantity: 10,
        }]);

        view.delete(&app, "1", false).await.unwrap();
        assert_eq!(view.state.success().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn a_failed_list_fetch_becomes_an_inline_error() {
        let stub = Router::new().route(
            "/product-service/products",
            routing::get(|| async {
                (AxStatus::INTERNAL_SERVER_ERROR, Json(json!({"message": "caiu"})))
            }),
        );
        let base = spawn(stub).await;
        let app = app_state(&base);

        let mut view = ProductsListView::new(CancellationToken::new());
        view.load(&app).await.unwrap();
        assert!(view.state.error().unwrap().contains("caiu"));
    }
}
