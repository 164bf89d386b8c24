//! Credential validation, run before any storage access.

use thiserror::Error;

/// Errors that can occur during credential validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialValidationError {
    #[error("username can't be empty")]
    EmptyUsername,

    #[error("password can't be empty")]
    EmptyPassword,
}

/// Validate a username/password pair.
///
/// Only emptiness is checked: usernames and passwords are otherwise opaque
/// to this system.
pub fn validate_credentials(
    username: &str,
    password: &str,
) -> Result<(), CredentialValidationError> {
    if username.is_empty() {
        return Err(CredentialValidationError::EmptyUsername);
    }

    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credentials() {
        assert!(validate_credentials("alice", "secret").is_ok());
    }

    #[test]
    fn test_empty_username() {
        assert_eq!(
            validate_credentials("", "secret"),
            Err(CredentialValidationError::EmptyUsername)
        );
    }

    #[test]
    fn test_empty_password() {
        assert_eq!(
            validate_credentials("alice", ""),
            Err(CredentialValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_both_empty_reports_username_first() {
        assert_eq!(
            validate_credentials("", ""),
            Err(CredentialValidationError::EmptyUsername)
        );
    }
}
