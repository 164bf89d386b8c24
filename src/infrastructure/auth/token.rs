//! Access token generation and stateless reverse resolution

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

use crate::domain::user::AccessToken;
use crate::domain::DomainError;

/// Trait for access token operations.
///
/// Tokens are stateless: `resolve_username` recovers the bound username from
/// the token alone, without a storage lookup.
pub trait AccessTokenGenerator: Send + Sync + Debug {
    /// Mint a new token bound to a username
    fn generate(&self, username: &str) -> Result<AccessToken, DomainError>;

    /// Recover the username a token was minted for. Fails for malformed,
    /// tampered or expired tokens.
    fn resolve_username(&self, token: &AccessToken) -> Result<String, DomainError>;
}

/// Token claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Unique token id, so two logins in the same second mint distinct tokens
    pub jti: Uuid,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    /// Create new claims for a username
    pub fn new(username: &str, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: username.to_string(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Configuration for the token generator
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: u64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
        }
    }
}

/// JWT (HS256) token generator
#[derive(Clone)]
pub struct JwtTokenGenerator {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtTokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenGenerator")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtTokenGenerator {
    /// Create a new token generator with the given configuration
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(TokenConfig::default())
    }
}

impl AccessTokenGenerator for JwtTokenGenerator {
    fn generate(&self, username: &str) -> Result<AccessToken, DomainError> {
        let claims = TokenClaims::new(username, self.config.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map(AccessToken::new)
            .map_err(|e| DomainError::storage(format!("Failed to generate token: {}", e)))
    }

    fn resolve_username(&self, token: &AccessToken) -> Result<String, DomainError> {
        let validation = Validation::default();

        let token_data = decode::<TokenClaims>(token.as_str(), &self.decoding_key, &validation)
            .map_err(|e| DomainError::validation(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_resolve() {
        let generator = JwtTokenGenerator::with_default_config();

        let token = generator.generate("alice").unwrap();
        let username = generator.resolve_username(&token).unwrap();

        assert_eq!(username, "alice");
    }

    #[test]
    fn test_tokens_are_distinct() {
        let generator = JwtTokenGenerator::with_default_config();

        let t1 = generator.generate("alice").unwrap();
        let t2 = generator.generate("alice").unwrap();

        assert_ne!(t1, t2);
    }

    #[test]
    fn test_resolve_garbage_token() {
        let generator = JwtTokenGenerator::with_default_config();

        let result = generator.resolve_username(&AccessToken::new("garbage-token"));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_with_wrong_secret() {
        let generator = JwtTokenGenerator::new(TokenConfig::new("secret-a", 24));
        let other = JwtTokenGenerator::new(TokenConfig::new("secret-b", 24));

        let token = generator.generate("alice").unwrap();

        assert!(other.resolve_username(&token).is_err());
    }
}
