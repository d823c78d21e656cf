//! Venue API key authentication.

mod errors;
mod keys;
mod models;
mod repository;
mod service;

pub use errors::*;
pub use keys::*;
pub use models::*;
pub use service::*;
