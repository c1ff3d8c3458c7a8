pub mod auth;
pub use auth::AuthService;
pub mod roles;
pub use roles::{Role, resolve_role};
pub mod session;
pub use session::{SessionHandle, SessionSnapshot};
