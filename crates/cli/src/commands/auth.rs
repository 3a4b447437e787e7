//! Credential tooling.
//!
//! User records carry Argon2id hashes in their `Password Hash` field; this
//! command produces one for pasting into Airtable when onboarding a user.

use password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use thiserror::Error;

/// Errors that can occur while hashing.
#[derive(Debug, Error)]
pub enum AuthCmdError {
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Hashing error: {0}")]
    Hash(String),
}

/// Hash a password and print the PHC string to stdout.
///
/// # Errors
///
/// Returns an error for an empty password or a hashing failure.
pub fn hash_password(password: &str) -> Result<(), AuthCmdError> {
    let phc = hash_to_phc(password)?;
    println!("{phc}");
    Ok(())
}

fn hash_to_phc(password: &str) -> Result<String, AuthCmdError> {
    if password.is_empty() {
        return Err(AuthCmdError::EmptyPassword);
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthCmdError::Hash(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    #[test]
    fn test_hash_verifies_round_trip() {
        let phc = hash_to_phc("correct horse").unwrap();
        let parsed = PasswordHash::new(&phc).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong", &parsed)
                .is_err()
        );
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(hash_to_phc(""), Err(AuthCmdError::EmptyPassword)));
    }
}
