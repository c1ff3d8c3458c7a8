// src/middleware/routes.rs

use std::fmt;

use crate::middleware::guards::Guard;

// Os destinos de navegação do cliente, espelhando a tabela de rotas da
// aplicação. O shell interpreta caminhos ("/products/5") e apelidos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A rota de entrada "/" (redireciona para a lista de produtos).
    Entry,
    Products,
    ProductDetail(String),
    ProductNew,
    ProductEdit(String),
    Commands,
    CommandDetail(String),
    CommandNew,
    MyCommands,
    Profile,
}

impl Route {
    /// Interpreta um caminho. `None` para caminho desconhecido.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_start_matches('/').trim_end_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        match segments.as_slice() {
            [] => Some(Route::Entry),
            ["products"] => Some(Route::Products),
            ["products", "new"] => Some(Route::ProductNew),
            ["products", "edit", id] => Some(Route::ProductEdit(id.to_string())),
            ["products", id] => Some(Route::ProductDetail(id.to_string())),
            ["commands"] => Some(Route::Commands),
            ["commands", "new"] => Some(Route::CommandNew),
            ["commands", id] => Some(Route::CommandDetail(id.to_string())),
            ["my-commands"] => Some(Route::MyCommands),
            ["profile"] => Some(Route::Profile),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Entry => "/".to_string(),
            Route::Products => "/products".to_string(),
            Route::ProductDetail(id) => format!("/products/{}", id),
            Route::ProductNew => "/products/new".to_string(),
            Route::ProductEdit(id) => format!("/products/edit/{}", id),
            Route::Commands => "/commands".to_string(),
            Route::CommandDetail(id) => format!("/commands/{}", id),
            Route::CommandNew => "/commands/new".to_string(),
            Route::MyCommands => "/my-commands".to_string(),
            Route::Profile => "/profile".to_string(),
        }
    }

    /// A cadeia ordenada de guards da rota. O guard externo decide antes do
    /// interno ser avaliado (curto-circuito).
    pub fn guards(&self) -> &'static [Guard] {
        match self {
            Route::Entry => &[],
            Route::Products | Route::ProductDetail(_) => &[Guard::Authenticated],
            // O formulário de produto é de administração; a checagem que no
            // original morava dentro da página vira um guard explícito.
            Route::ProductNew | Route::ProductEdit(_) => {
                &[Guard::Authenticated, Guard::AdminOnly]
            }
            Route::Commands => &[Guard::Authenticated, Guard::AdminOnly],
            Route::CommandDetail(_) => &[Guard::Authenticated],
            Route::CommandNew | Route::MyCommands => {
                &[Guard::Authenticated, Guard::ClientOnly]
            }
            Route::Profile => &[Guard::Authenticated],
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
