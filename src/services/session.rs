// src/services/session.rs

use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::auth::{Claims, Session, TokenSet};

// Estado interno do detentor da sessão.
// "Uninitialized" é o sentinela de antes do bootstrap; depois do init a
// sessão fica "Unauthenticated" até o login estabelecer uma.
#[derive(Debug, Clone)]
enum SessionState {
    Uninitialized,
    Unauthenticated,
    Authenticated(Session),
}

// Fotografia imutável da sessão no instante da leitura. Guards e o resolvedor
// de papel trabalham só em cima disso, nunca no estado vivo.
#[derive(Debug, Clone)]
pub enum SessionSnapshot {
    Uninitialized,
    Unauthenticated,
    Authenticated(Session),
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionSnapshot::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionSnapshot::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Detentor da sessão. Construído explicitamente no main e injetado em quem
/// precisa (cliente de identidade, camada de requisição, guards, views);
/// não existe estado global.
///
/// Só o cliente de identidade e o caminho de refresh da camada de requisição
/// modificam o estado; todo o resto lê via `snapshot()`.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::Uninitialized)),
        }
    }

    /// Marca o fim do bootstrap: a partir daqui "não autenticado" deixa de
    /// significar "ainda não inicializado".
    pub fn mark_initialized(&self) {
        let mut state = self.inner.write();
        if matches!(*state, SessionState::Uninitialized) {
            *state = SessionState::Unauthenticated;
        }
    }

    /// Estabelece uma sessão recém autenticada (caminho do login).
    pub fn establish(&self, session: Session) {
        *self.inner.write() = SessionState::Authenticated(session);
    }

    /// Troca os tokens da sessão vigente (caminho do refresh). Não faz nada
    /// se não houver sessão, o refresh de uma sessão morta não ressuscita nada.
    pub fn replace_tokens(&self, tokens: TokenSet, claims: Claims) {
        let mut state = self.inner.write();
        if let SessionState::Authenticated(session) = &mut *state {
            session.tokens = tokens;
            session.claims = claims;
        }
    }

    /// Destrói a sessão (logout ou refresh falhado). O handle continua
    /// utilizável, mas volta ao estado não autenticado.
    pub fn teardown(&self) {
        let mut state = self.inner.write();
        if !matches!(*state, SessionState::Uninitialized) {
            *state = SessionState::Unauthenticated;
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match &*self.inner.read() {
            SessionState::Uninitialized => SessionSnapshot::Uninitialized,
            SessionState::Unauthenticated => SessionSnapshot::Unauthenticated,
            SessionState::Authenticated(session) => {
                SessionSnapshot::Authenticated(session.clone())
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.inner.read(), SessionState::Authenticated(_))
    }

    /// Access token atual, se houver sessão.
    pub fn access_token(&self) -> Option<String> {
        match &*self.inner.read() {
            SessionState::Authenticated(session) => {
                Some(session.tokens.access_token.clone())
            }
            _ => None,
        }
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
