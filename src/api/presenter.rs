//! HTTP presenter
//!
//! Maps navigation decisions of the login flow onto HTTP redirects.

use axum::http::{HeaderMap, header};
use axum::response::Redirect;

use crate::auth::{INDEX_VIEW, Presenter};
use crate::config::ServerConfig;
use crate::error::AppError;

/// Presenter producing HTTP redirect responses.
///
/// Navigation only makes sense for clients that will follow a redirect to
/// an HTML page. A request that exclusively accepts `application/json` is
/// not of a navigable kind and is refused.
pub struct WebPresenter {
    index_uri: String,
    navigable: bool,
}

impl WebPresenter {
    pub fn from_request(server: &ServerConfig, headers: &HeaderMap) -> Self {
        Self {
            index_uri: server.index_uri.clone(),
            navigable: accepts_navigation(headers),
        }
    }

    fn ensure_navigable(&self) -> Result<(), AppError> {
        if self.navigable {
            Ok(())
        } else {
            Err(AppError::UnsupportedRequestType(
                "the request only accepts application/json".to_string(),
            ))
        }
    }
}

impl Presenter for WebPresenter {
    type Output = Redirect;

    fn redirect_to_uri(&self, uri: &str) -> Result<Redirect, AppError> {
        self.ensure_navigable()?;
        // The target is used exactly as supplied
        Ok(Redirect::to(uri))
    }

    fn forward_to(&self, view: &str) -> Result<Redirect, AppError> {
        self.ensure_navigable()?;
        match view {
            INDEX_VIEW => Ok(Redirect::to(&self.index_uri)),
            other => Err(AppError::Validation(format!("unknown view '{other}'"))),
        }
    }
}

/// A request can carry a navigation instruction unless its Accept header
/// narrows the response down to JSON.
fn accepts_navigation(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return true;
    };

    if accept.contains("text/html") || accept.contains("*/*") {
        return true;
    }

    !accept.contains("application/json")
}
