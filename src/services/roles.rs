// src/services/roles.rs

use crate::models::auth::Session;
use crate::services::session::SessionSnapshot;

// Os dois papéis efetivos possíveis. Derivado das claims, nunca armazenado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Admin => "ADMIN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Client => "Cliente",
            Role::Admin => "Administrador",
        }
    }
}

/// Resolve o papel efetivo da sessão: o PRIMEIRO papel das claims (na ordem
/// em que o provedor mandou) que case, ignorando maiúsculas, com CLIENT ou
/// ADMIN. Sem papel reconhecido, cai fechado para CLIENT. Nunca falha.
pub fn resolve_role(session: &Session) -> Role {
    session
        .claims
        .roles()
        .iter()
        .find_map(|role| match role.to_uppercase().as_str() {
            "CLIENT" => Some(Role::Client),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        })
        .unwrap_or(Role::Client)
}

/// Papel da fotografia da sessão; `None` quando não há sessão autenticada.
pub fn snapshot_role(snapshot: &SessionSnapshot) -> Option<Role> {
    snapshot.session().map(resolve_role)
}
