use std::collections::HashMap;

use async_trait::async_trait;
use auth::PasswordHasher;

use crate::domain::token::errors::ConfigurationError;
use crate::domain::token::errors::IdentityError;
use crate::domain::token::models::Credentials;
use crate::domain::token::models::Identity;
use crate::domain::token::ports::IdentityVerifier;

/// A user account known to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    /// Argon2id hash in PHC string format
    pub password_hash: String,
    pub is_active: bool,
}

/// Identity verifier over a fixed set of accounts loaded at start-up.
pub struct StaticUserDirectory {
    users: HashMap<String, UserRecord>,
    hasher: PasswordHasher,
}

impl StaticUserDirectory {
    /// Build the directory.
    ///
    /// # Errors
    /// * `DuplicateUsername` - Two records share a username
    pub fn new(records: Vec<UserRecord>) -> Result<Self, ConfigurationError> {
        let mut users = HashMap::with_capacity(records.len());
        for record in records {
            let username = record.username.clone();
            if users.insert(username.clone(), record).is_some() {
                return Err(ConfigurationError::DuplicateUsername(username));
            }
        }

        Ok(Self {
            users,
            hasher: PasswordHasher::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticUserDirectory {
    async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Identity, IdentityError> {
        let Some(user) = self.users.get(&credentials.username) else {
            self.hasher.burn(&credentials.password);
            return Err(IdentityError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify(&credentials.password, &user.password_hash)?
        {
            return Err(IdentityError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(IdentityError::InactiveAccount);
        }

        Ok(Identity {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
        })
    }
}
