pub mod guards;
pub use guards::{Guard, GuardDecision};
pub mod routes;
pub use routes::Route;
