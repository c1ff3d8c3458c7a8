// src/middleware/guards.rs

use crate::{
    middleware::routes::Route,
    services::{roles::Role, roles::snapshot_role, session::SessionSnapshot},
};

// Decisão tipada de um guard. Nada de renderização condicional aninhada:
// ou a rota renderiza, ou a navegação segue para o destino indicado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

// Os três predicados empilháveis de proteção de rota. Cada um é uma função
// pura da fotografia da sessão; sem histórico, sem efeitos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Passa com sessão inicializada E autenticada; senão volta à entrada.
    Authenticated,
    /// Passa com papel efetivo ADMIN; senão vai para a lista de produtos.
    AdminOnly,
    /// Passa com papel efetivo CLIENT; senão vai para a lista de produtos.
    ClientOnly,
}

impl Guard {
    pub fn check(&self, snapshot: &SessionSnapshot) -> GuardDecision {
        match self {
            Guard::Authenticated => {
                if snapshot.is_authenticated() {
                    GuardDecision::Allow
                } else {
                    GuardDecision::Redirect(Route::Entry)
                }
            }
            Guard::AdminOnly => match snapshot_role(snapshot) {
                Some(Role::Admin) => GuardDecision::Allow,
                _ => GuardDecision::Redirect(Route::Products),
            },
            Guard::ClientOnly => match snapshot_role(snapshot) {
                Some(Role::Client) => GuardDecision::Allow,
                _ => GuardDecision::Redirect(Route::Products),
            },
        }
    }
}

/// Avalia a cadeia em ordem, parando na primeira decisão que não for Allow.
pub fn evaluate(chain: &[Guard], snapshot: &SessionSnapshot) -> GuardDecision {
    for guard in chain {
        match guard.check(snapshot) {
            GuardDecision::Allow => continue,
            decision => return decision,
        }
    }
    GuardDecision::Allow
}
