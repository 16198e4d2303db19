//! Authentication engine
//!
//! Runs the credential provider chain and owns every mutation of the
//! security context. The login flow only observes what the engine decides.

use super::outcome::{AuthFailure, AuthenticationOutcome};
use super::provider::CredentialProvider;
use super::session::{Account, SecurityContext};
use crate::error::AppError;
use crate::metrics::{AUTH_ATTEMPTS_TOTAL, LOGOUTS_TOTAL, SESSIONS_ESTABLISHED_TOTAL};

/// Credentials submitted with one login attempt
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Keep passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Drives authentication attempts through an ordered provider chain
pub struct AuthenticationEngine {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl AuthenticationEngine {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Run one authentication attempt.
    ///
    /// Produces exactly one outcome:
    /// - missing credentials yield a failure without a structured cause
    /// - the first provider accepting the credentials wins
    /// - a fully traversed chain yields a wrong-credentials failure
    ///
    /// # Errors
    /// Only infrastructure errors from a provider; a wrong password is an
    /// outcome, not an error.
    pub fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationOutcome, AppError> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            AUTH_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
            tracing::debug!("Authentication attempt with missing credentials");
            return Ok(AuthenticationOutcome::Failure(AuthFailure::WithoutCause));
        }

        for provider in &self.providers {
            if let Some(account) =
                provider.verify(&credentials.username, &credentials.password)?
            {
                AUTH_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
                tracing::info!(
                    username = %account.username,
                    provider = provider.name(),
                    "Authentication succeeded"
                );
                return Ok(AuthenticationOutcome::Success(account));
            }
        }

        AUTH_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
        tracing::info!(username = %credentials.username, "Authentication failed");
        Ok(AuthenticationOutcome::Failure(AuthFailure::wrong_credentials()))
    }

    /// Bind an authenticated account to the security context.
    pub fn establish(&self, context: &mut SecurityContext, account: Account) {
        SESSIONS_ESTABLISHED_TOTAL.inc();
        context.establish(account);
    }

    /// Invalidate the current session.
    ///
    /// Logging out an anonymous context is a no-op success.
    pub fn logout(&self, context: &mut SecurityContext) {
        if context.clear() {
            LOGOUTS_TOTAL.inc();
            tracing::info!("Session invalidated");
        } else {
            tracing::debug!("Logout requested for anonymous session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        name: &'static str,
        username: &'static str,
    }

    impl CredentialProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn verify(&self, username: &str, _password: &str) -> Result<Option<Account>, AppError> {
            if username == self.username {
                Ok(Some(Account {
                    username: username.to_string(),
                    display_name: Some(self.name.to_string()),
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn engine() -> AuthenticationEngine {
        AuthenticationEngine::new(vec![
            Box::new(FixedProvider {
                name: "first",
                username: "alice",
            }),
            Box::new(FixedProvider {
                name: "second",
                username: "alice",
            }),
            Box::new(FixedProvider {
                name: "third",
                username: "bob",
            }),
        ])
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn first_accepting_provider_wins() {
        let outcome = engine().authenticate(&credentials("alice", "pw")).unwrap();
        match outcome {
            AuthenticationOutcome::Success(account) => {
                assert_eq!(account.display_name.as_deref(), Some("first"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn unknown_user_falls_through_the_chain() {
        let outcome = engine().authenticate(&credentials("bob", "pw")).unwrap();
        match outcome {
            AuthenticationOutcome::Success(account) => {
                assert_eq!(account.display_name.as_deref(), Some("third"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_chain_is_a_structured_failure() {
        let outcome = engine().authenticate(&credentials("mallory", "pw")).unwrap();
        match outcome {
            AuthenticationOutcome::Failure(failure) => {
                assert_eq!(failure.code(), super::super::outcome::WRONG_CREDENTIALS_CODE);
                assert_eq!(failure.reason(), Some("wrong credentials"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_credentials_fail_without_a_cause() {
        let outcome = engine().authenticate(&credentials("", "")).unwrap();
        match outcome {
            AuthenticationOutcome::Failure(failure) => {
                assert_eq!(failure.reason(), None);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn logout_is_idempotent() {
        let engine = engine();
        let mut context = SecurityContext::anonymous();

        // Anonymous logout is a no-op success
        engine.logout(&mut context);
        assert!(context.account().is_none());

        engine.establish(
            &mut context,
            Account {
                username: "alice".to_string(),
                display_name: None,
            },
        );
        assert!(context.account().is_some());

        engine.logout(&mut context);
        assert!(context.account().is_none());
        engine.logout(&mut context);
        assert!(context.account().is_none());
    }

    #[test]
    fn redacted_debug_output_for_credentials() {
        let debug = format!("{:?}", credentials("alice", "hunter2"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
