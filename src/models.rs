pub mod auth;
pub use auth::{Claims, Session, TokenSet, UserProfile};
pub mod product;
pub use product::{Product, ProductPayload};
pub mod command;
pub use command::{Command, CommandStatus, CreateCommandPayload};
