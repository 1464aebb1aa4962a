use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Argon2id password hasher.
///
/// Holds a throwaway hash so that lookups of unknown accounts can spend the
/// same work as a real verification (see [`PasswordHasher::burn`]).
pub struct PasswordHasher {
    decoy_hash: Option<String>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        let decoy_hash = Self::hash_with_default("decoy-password-for-timing").ok();
        Self { decoy_hash }
    }

    /// Hash a plaintext password into PHC string format with a random salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Self::hash_with_default(password)
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Run a verification whose result is discarded.
    ///
    /// Called when the account does not exist, so that response timing does
    /// not reveal which usernames are registered.
    pub fn burn(&self, password: &str) {
        if let Some(decoy) = &self.decoy_hash {
            let _ = self.verify(password, decoy);
        }
    }

    fn hash_with_default(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
