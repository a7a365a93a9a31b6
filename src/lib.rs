pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod quote;
pub mod session;

pub use client::ApiClient;
pub use config::Config;
pub use error::ClientError;
pub use session::Session;
