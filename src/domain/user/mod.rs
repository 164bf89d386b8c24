//! User domain types

pub mod entity;
pub mod validation;

pub use entity::{AccessToken, Session, User, UserView};
pub use validation::{validate_credentials, CredentialValidationError};
