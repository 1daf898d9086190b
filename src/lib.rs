pub mod api;
pub mod article;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod store;

pub use error::RestError;
