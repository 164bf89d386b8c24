//! Authentication collaborators: password hashing and access tokens

pub mod password;
pub mod token;

pub use password::{Argon2Hasher, PasswordHasher};
pub use token::{AccessTokenGenerator, JwtTokenGenerator, TokenClaims, TokenConfig};
