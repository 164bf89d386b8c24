//! Domain layer: the persisted data model and the error taxonomy.

pub mod error;
pub mod user;

pub use error::DomainError;
