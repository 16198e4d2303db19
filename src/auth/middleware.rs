//! Request-scoped security context extraction
//!
//! Rebuilds the security context from the session cookie on every request.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use super::session::{SESSION_COOKIE, SecurityContext, verify_session_token};
use crate::AppState;

/// Extractor yielding the visitor's security context.
///
/// A missing, invalid, or expired session token yields an anonymous
/// context; extraction itself never fails.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     VisitorContext(context): VisitorContext,
/// ) -> impl IntoResponse {
///     match context.account() { ... }
/// }
/// ```
#[derive(Debug)]
pub struct VisitorContext(pub SecurityContext);

#[async_trait]
impl<S> FromRequestParts<S> for VisitorContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let context = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| {
                verify_session_token(cookie.value(), &app_state.config.auth.session_secret).ok()
            })
            .map(SecurityContext::for_session)
            .unwrap_or_else(SecurityContext::anonymous);

        Ok(VisitorContext(context))
    }
}
