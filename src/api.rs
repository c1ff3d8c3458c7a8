pub mod client;
pub use client::ApiClient;
pub mod endpoints;
pub use endpoints::Endpoints;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod command_repo;
pub use command_repo::CommandRepository;
