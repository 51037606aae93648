//! Password hashing and verification using Argon2id.
//!
//! Hashes are produced in PHC string format, so the algorithm, cost
//! parameters and salt travel with the hash. Verification reads the
//! parameters from the stored hash, which keeps older hashes verifiable after
//! the configured cost changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
};

use crate::TRACING_TARGET_HASHER as TRACING_TARGET;
use crate::{Error, Result};

/// OWASP recommended Argon2id memory cost (19 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 19456;
/// OWASP recommended Argon2id iteration count.
pub const DEFAULT_ITERATIONS: u32 = 2;
/// OWASP recommended Argon2id degree of parallelism.
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Failure outcome of a hashing or verification call.
///
/// Carries no detail from the underlying primitive: the cause is logged where
/// the failure happens and never handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The supplied password does not match the stored hash.
    #[error("password does not match")]
    Mismatch,
    /// The stored value is not a valid PHC hash.
    #[error("stored password hash is malformed")]
    MalformedHash,
    /// Salt generation or hashing failed.
    #[error("password hashing failed")]
    HashingFailed,
}

/// Password hashing and verification service using Argon2id.
///
/// The cost parameters are fixed at construction and shared read-only by
/// every clone.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a hasher with OWASP recommended parameters.
    ///
    /// - Memory cost: 19456 KiB (≈19 MB)
    /// - Time cost: 2 iterations
    /// - Parallelism: 1 lane
    pub fn new() -> Result<Self> {
        Self::with_params(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, DEFAULT_PARALLELISM)
    }

    /// Creates a hasher with explicit Argon2id cost parameters.
    ///
    /// # Errors
    ///
    /// Returns a crypto error when the parameters are outside the ranges
    /// Argon2 accepts (for example, memory below 8 KiB per lane).
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                memory_kib,
                iterations,
                parallelism,
                "failed to create Argon2 parameters"
            );

            Error::crypto("invalid password hashing parameters")
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            memory_kib,
            iterations,
            parallelism,
            "password hasher initialized"
        );

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Self { argon2 })
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// Returns a PHC string suitable for long-term storage.
    pub fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                CredentialError::HashingFailed
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::Mismatch`] when the password is wrong
    /// - [`CredentialError::MalformedHash`] when the stored value cannot be
    ///   parsed or verification fails for any other reason
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), CredentialError> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "stored password hash has an invalid format"
            );

            CredentialError::MalformedHash
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => {
                tracing::debug!(target: TRACING_TARGET, "password verification successful");
                Ok(())
            }
            Err(ArgonError::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "password verification failed: incorrect password"
                );
                Err(CredentialError::Mismatch)
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );
                Err(CredentialError::MalformedHash)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let hash = hasher.hash_password("secure_password_123")?;

        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert_eq!(hasher.verify_password("secure_password_123", &hash), Ok(()));
        assert_eq!(
            hasher.verify_password("wrong_password", &hash),
            Err(CredentialError::Mismatch)
        );

        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;

        let hash1 = hasher.hash_password("test_password")?;
        let hash2 = hasher.hash_password("test_password")?;

        assert_ne!(hash1, hash2);
        assert!(hasher.verify_password("test_password", &hash1).is_ok());
        assert!(hasher.verify_password("test_password", &hash2).is_ok());

        Ok(())
    }

    #[test]
    fn hash_never_contains_plaintext() -> anyhow::Result<()> {
        let hasher = PasswordHasher::with_params(64, 1, 1)?;
        let hash = hasher.hash_password("secret123")?;
        assert!(!hash.contains("secret123"));
        Ok(())
    }

    #[test]
    fn verify_rejects_malformed_hash() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        assert_eq!(
            hasher.verify_password("test_password", "invalid_hash_format"),
            Err(CredentialError::MalformedHash)
        );
        assert_eq!(
            hasher.verify_password("test_password", "secret123"),
            Err(CredentialError::MalformedHash)
        );
        Ok(())
    }

    #[test]
    fn verify_uses_parameters_from_stored_hash() -> anyhow::Result<()> {
        let cheap = PasswordHasher::with_params(64, 1, 1)?;
        let hash = cheap.hash_password("rotated_cost")?;

        let default = PasswordHasher::new()?;
        assert!(default.verify_password("rotated_cost", &hash).is_ok());
        Ok(())
    }

    #[test]
    fn reject_invalid_parameters() {
        let result = PasswordHasher::with_params(1, 1, 1);
        assert!(result.is_err_and(|e| e.kind() == crate::ErrorKind::Crypto));

        assert!(PasswordHasher::with_params(DEFAULT_MEMORY_KIB, 0, 1).is_err());
    }
}
