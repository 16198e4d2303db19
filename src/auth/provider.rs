//! Credential providers
//!
//! A provider checks one backend for a username/password pair. Providers
//! are chained by the engine; `Ok(None)` means "not my user, ask the next
//! one". Only infrastructure problems (unreadable hashes) are errors.

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};

use super::session::Account;
use crate::config::AccountConfig;
use crate::error::AppError;

/// A pluggable credential-checking backend
pub trait CredentialProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    /// Verify a username/password pair against this backend.
    ///
    /// # Returns
    /// The matching account on success, `None` when this backend does not
    /// accept the credentials.
    fn verify(&self, username: &str, password: &str) -> Result<Option<Account>, AppError>;
}

/// Provider backed by accounts declared in the configuration file.
///
/// Passwords are stored as argon2id PHC strings.
pub struct ConfigAccountProvider {
    accounts: Vec<AccountConfig>,
}

impl ConfigAccountProvider {
    pub fn new(accounts: Vec<AccountConfig>) -> Self {
        Self { accounts }
    }
}

impl CredentialProvider for ConfigAccountProvider {
    fn name(&self) -> &str {
        "config-accounts"
    }

    fn verify(&self, username: &str, password: &str) -> Result<Option<Account>, AppError> {
        let Some(entry) = self.accounts.iter().find(|a| a.username == username) else {
            return Ok(None);
        };

        let stored = PasswordHash::new(&entry.password_hash).map_err(|e| {
            AppError::Credential(format!(
                "stored hash for '{}' is not a valid PHC string: {e}",
                entry.username
            ))
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(Some(Account {
                username: entry.username.clone(),
                display_name: entry.display_name.clone(),
            })),
            Err(argon2::password_hash::Error::Password) => Ok(None),
            Err(e) => Err(AppError::Credential(format!(
                "verification failed for '{}': {e}",
                entry.username
            ))),
        }
    }
}
