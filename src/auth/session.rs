//! Session management
//!
//! Uses HMAC-signed tokens stored in cookies.
//! No server-side session storage needed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// An authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub display_name: Option<String>,
}

impl Account {
    /// Name suitable for greeting the visitor
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Visitor session data
///
/// Stored in a signed cookie. Expiry is enforced on verification, not by
/// the cookie itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub account: Account,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Open a session for `account` lasting `max_age_seconds`.
    pub fn new(account: Account, max_age_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            account,
            created_at: now,
            expires_at: now + Duration::seconds(max_age_seconds),
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Holder of the current authenticated identity for one request.
///
/// Mutated only by the authentication engine; everything else reads it.
#[derive(Debug, Default)]
pub struct SecurityContext {
    account: Option<Account>,
}

impl SecurityContext {
    /// Context with no authenticated identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context restored from a verified session
    pub fn for_session(session: Session) -> Self {
        Self {
            account: Some(session.account),
        }
    }

    /// The currently authenticated account, if any
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub(crate) fn establish(&mut self, account: Account) {
        self.account = Some(account);
    }

    /// Drop the authenticated identity. Returns whether one was present.
    pub(crate) fn clear(&mut self) -> bool {
        self.account.take().is_some()
    }
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// # Arguments
/// * `session` - Session data to encode
/// * `secret` - HMAC secret key
///
/// # Returns
/// Signed token string
pub fn create_session_token(
    session: &Session,
    secret: &str,
) -> Result<String, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // 1. Serialize session to JSON
    let payload =
        serde_json::to_string(session).map_err(|e| crate::error::AppError::Internal(e.into()))?;

    // 2. Base64 encode the payload
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    // 3. Create HMAC-SHA256 signature
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    // 4. Return "{payload}.{signature}"
    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a session token
///
/// # Arguments
/// * `token` - Token string to verify
/// * `secret` - HMAC secret key
///
/// # Returns
/// Decoded session if valid
///
/// # Errors
/// Returns error if signature is invalid, token is malformed, or the
/// session has expired
pub fn verify_session_token(token: &str, secret: &str) -> Result<Session, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // 1. Split token into payload and signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(crate::error::AppError::Unauthorized);
    }

    let payload_b64 = parts[0];
    let signature_b64 = parts[1];

    // 2. Verify HMAC signature
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());

    let expected_signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    // 3. Decode and deserialize payload
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    let payload_str =
        String::from_utf8(payload_bytes).map_err(|_| crate::error::AppError::Unauthorized)?;

    let session: Session =
        serde_json::from_str(&payload_str).map_err(|_| crate::error::AppError::Unauthorized)?;

    // 4. Check if session is expired
    if session.is_expired() {
        return Err(crate::error::AppError::Unauthorized);
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-32-bytes-long!!!";

    fn visitor() -> Account {
        Account {
            username: "visitor".to_string(),
            display_name: Some("A Visitor".to_string()),
        }
    }

    #[test]
    fn token_round_trips() {
        let session = Session::new(visitor(), 3600);
        let token = create_session_token(&session, SECRET).unwrap();

        let verified = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(verified.account, visitor());
        assert_eq!(verified.created_at, session.created_at);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let session = Session::new(visitor(), 3600);
        let token = create_session_token(&session, SECRET).unwrap();

        let (payload, signature) = token.split_once('.').unwrap();
        let mut tampered = payload.to_string();
        tampered.push('x');
        let token = format!("{tampered}.{signature}");

        assert!(verify_session_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let session = Session::new(visitor(), 3600);
        let token = create_session_token(&session, SECRET).unwrap();

        assert!(verify_session_token(&token, "another-secret-key-32-bytes!!!!!").is_err());
    }

    #[test]
    fn expired_session_is_rejected() {
        let session = Session::new(visitor(), -60);
        let token = create_session_token(&session, SECRET).unwrap();

        assert!(verify_session_token(&token, SECRET).is_err());
    }

    #[test]
    fn context_reflects_engine_mutations() {
        let mut context = SecurityContext::anonymous();
        assert!(context.account().is_none());

        context.establish(visitor());
        assert_eq!(context.account(), Some(&visitor()));

        assert!(context.clear());
        assert!(context.account().is_none());
        assert!(!context.clear());
    }
}
