//! credstore
//!
//! Durable, transactionally-consistent storage of user credentials and login
//! sessions, backed by an embedded transactional key-value store. The
//! repository turns registration, login, token validation, logout and
//! counting into atomic read-modify-write sequences, composed with pluggable
//! password-hashing and access-token collaborators.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::user::{AccessToken, User, UserView};
pub use domain::DomainError;
pub use infrastructure::auth::{
    AccessTokenGenerator, Argon2Hasher, JwtTokenGenerator, PasswordHasher, TokenConfig,
};
pub use infrastructure::user::{open_database, UserRepository};
