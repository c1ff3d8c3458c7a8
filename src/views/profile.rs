// src/views/profile.rs

use crate::{
    common::error::AppError,
    models::auth::UserProfile,
    services::roles::{Role, resolve_role},
    services::session::SessionSnapshot,
    views::state::ViewState,
};

// ---
// View: perfil do usuário
// ---
// Nenhuma chamada de rede: tudo sai das claims do token.
pub struct ProfileView {
    pub state: ViewState<(UserProfile, Role)>,
}

impl ProfileView {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
        }
    }

    pub fn load(&mut self, snapshot: &SessionSnapshot) -> Result<(), AppError> {
        let Some(session) = snapshot.session() else {
            return Err(AppError::SessionNotInitialized);
        };
        let profile = UserProfile::from(session);
        let role = resolve_role(session);
        self.state = ViewState::Success((profile, role));
        Ok(())
    }

    pub fn render(&self) {
        let Some((profile, role)) = self.state.success() else {
            return;
        };
        println!("== Meu Perfil ==");
        println!("  Nome completo: {}", profile.name);
        println!("  Email: {}", profile.email);
        println!("  Nome de usuário: {}", profile.username);
        println!("  ID: {}", profile.id);
        println!("  Papel: {} ({})", role.label(), role.as_str());
        if profile.roles.len() > 1 {
            println!("  Todos os papéis: {}", profile.roles.join(", "));
        }
        println!("Comandos: logout");
    }
}

impl Default for ProfileView {
    fn default() -> Self {
        Self::new()
    }
}
