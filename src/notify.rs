//! Flash-style notifications
//!
//! One-shot, severity-tagged messages shown on the next rendered view.
//! Pending messages ride in a cookie: stored when a request finishes with
//! something to say, consumed (and cleared) by the next page render.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

/// Cookie carrying pending flash messages
pub const FLASH_COOKIE: &str = "flash";

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

/// A one-shot user-facing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Numeric code identifying the condition behind the message
    pub code: i64,
}

impl FlashMessage {
    /// Create an error-severity message.
    pub fn error(title: String, message: String, code: i64) -> Self {
        Self {
            severity: Severity::Error,
            title,
            message,
            code,
        }
    }
}

/// Receiver side of notification delivery.
///
/// The login flow hands messages to a sink; what happens to them afterwards
/// (cookie storage, test capture) is the sink's business.
pub trait NotificationSink {
    fn push(&mut self, message: FlashMessage);
}

/// Collects messages produced during one request
#[derive(Debug, Default)]
pub struct FlashBucket {
    messages: Vec<FlashMessage>,
}

impl FlashBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    /// Store the collected messages in the flash cookie.
    ///
    /// An empty bucket leaves the jar untouched.
    pub fn store(self, jar: CookieJar, secure: bool) -> CookieJar {
        if self.messages.is_empty() {
            return jar;
        }

        let cookie = Cookie::build((FLASH_COOKIE, encode(&self.messages)))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .build();
        jar.add(cookie)
    }
}

impl NotificationSink for FlashBucket {
    fn push(&mut self, message: FlashMessage) {
        self.messages.push(message);
    }
}

/// Read pending messages from the flash cookie and clear it.
///
/// Returns the messages (possibly none) and the jar with the cookie removed,
/// making the messages one-shot. A cookie that fails to decode is discarded
/// silently.
pub fn take_flashes(jar: CookieJar) -> (Vec<FlashMessage>, CookieJar) {
    let messages = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| decode(cookie.value()))
        .unwrap_or_default();

    let mut removal = Cookie::from(FLASH_COOKIE);
    removal.set_path("/");
    (messages, jar.remove(removal))
}

fn encode(messages: &[FlashMessage]) -> String {
    use base64::{Engine as _, engine::general_purpose};

    // Serialization of plain strings and integers cannot fail
    let payload = serde_json::to_vec(messages).unwrap_or_default();
    general_purpose::URL_SAFE_NO_PAD.encode(payload)
}

fn decode(value: &str) -> Option<Vec<FlashMessage>> {
    use base64::{Engine as _, engine::general_purpose};

    let payload = general_purpose::URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> FlashMessage {
        FlashMessage::error(
            "Login not successful".to_string(),
            "The entered username or password was wrong".to_string(),
            1_496_914_553,
        )
    }

    #[test]
    fn messages_round_trip_through_the_cookie() {
        let mut bucket = FlashBucket::new();
        bucket.push(sample_message());

        let jar = bucket.store(CookieJar::new(), false);
        let (messages, _jar) = take_flashes(jar);

        assert_eq!(messages, vec![sample_message()]);
    }

    #[test]
    fn taking_flashes_clears_the_cookie() {
        let mut bucket = FlashBucket::new();
        bucket.push(sample_message());

        let jar = bucket.store(CookieJar::new(), false);
        let (_, jar) = take_flashes(jar);

        // The removal cookie is still in the jar, but carries no value
        let (messages, _) = take_flashes(jar);
        assert!(messages.is_empty());
    }

    #[test]
    fn empty_bucket_sets_no_cookie() {
        let jar = FlashBucket::new().store(CookieJar::new(), false);
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn garbage_cookie_value_is_discarded() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "not!base64"));
        let (messages, _) = take_flashes(jar);
        assert!(messages.is_empty());
    }
}
