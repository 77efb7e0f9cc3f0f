//! Argon2id password hashes in PHC string form.
//!
//! Hashing is CPU-bound, so both directions run on the blocking pool.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("invalid argon2 parameters: {0}")]
    Params(argon2::Error),

    #[error("password task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(15000, 2, 1, None).map_err(PasswordError::Params)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        span.in_scope(|| {
            let salt = SaltString::generate(&mut OsRng);
            hasher()?
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(PasswordError::Hash)
        })
    })
    .await?
}

/// `Ok(false)` for a wrong password or a stored value that is not a PHC hash
pub async fn verify_password(password: String, stored: String) -> Result<bool, PasswordError> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        span.in_scope(|| {
            let Ok(expected) = PasswordHash::new(&stored) else {
                tracing::warn!("Stored password hash is not in PHC format");
                return Ok(false);
            };
            match hasher()?.verify_password(password.as_bytes(), &expected) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(PasswordError::Hash(e)),
            }
        })
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_and_are_salted() {
        let first = hash_password("secret1".to_string()).await.unwrap();
        let second = hash_password("secret1".to_string()).await.unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));

        assert!(verify_password("secret1".to_string(), first.clone()).await.unwrap());
        assert!(verify_password("secret1".to_string(), second).await.unwrap());
        assert!(!verify_password("secret2".to_string(), first).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hashes_never_verify() {
        for stored in ["", "sha256$salt$abc", "not a hash"] {
            assert!(!verify_password("x".to_string(), stored.to_string()).await.unwrap(), "{}", stored);
        }
    }
}
