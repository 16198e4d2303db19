//! Login flow
//!
//! Sits between the authentication engine and the presenter: receives the
//! outcome of an authentication attempt and decides where to send the
//! visitor next. Owns no state of its own beyond its injected collaborators.

use std::sync::Arc;

use super::engine::AuthenticationEngine;
use super::outcome::AuthFailure;
use super::session::{Account, SecurityContext};
use crate::error::AppError;
use crate::i18n::Translator;
use crate::notify::{FlashMessage, NotificationSink};

/// Label id of the failure notification title
pub const FAILURE_TITLE_LABEL: &str = "authentication.failure.title";
/// Label id of the failure notification message
pub const FAILURE_MESSAGE_LABEL: &str = "authentication.failure.message";
/// Name of the default navigation target
pub const INDEX_VIEW: &str = "index";

/// Turns navigation decisions into responses.
///
/// The web implementation produces HTTP redirects; tests record the target.
/// A presenter may refuse to navigate the current request kind, in which
/// case its `UnsupportedRequestType` error propagates unchanged.
pub trait Presenter {
    type Output;

    /// Navigate to the given URI, exactly as supplied.
    fn redirect_to_uri(&self, uri: &str) -> Result<Self::Output, AppError>;

    /// Navigate to a named view.
    fn forward_to(&self, view: &str) -> Result<Self::Output, AppError>;
}

/// Data exposed to the login view
#[derive(Debug)]
pub struct LoginView<'a> {
    /// The currently authenticated account, if any
    pub account: Option<&'a Account>,
}

/// The authentication flow controller.
///
/// Constructed once with its collaborators and shared across requests;
/// every method is a read-only observation of an attempt the engine drove.
pub struct LoginFlow {
    translator: Arc<dyn Translator>,
    translation_package_key: String,
    translation_source_name: String,
}

impl LoginFlow {
    pub fn new(
        translator: Arc<dyn Translator>,
        translation_package_key: String,
        translation_source_name: String,
    ) -> Self {
        Self {
            translator,
            translation_package_key,
            translation_source_name,
        }
    }

    /// Expose the current account (or none) to the login view.
    ///
    /// Read-only: the context is never touched.
    pub fn show_login_form<'a>(&self, context: &'a SecurityContext) -> LoginView<'a> {
        LoginView {
            account: context.account(),
        }
    }

    /// Invalidate the session, then navigate.
    ///
    /// Navigates to `redirect_after_logout` when present and non-empty,
    /// to the index view otherwise. Unconditional: logging out an
    /// anonymous session is a no-op success.
    pub fn handle_logout<P: Presenter>(
        &self,
        engine: &AuthenticationEngine,
        context: &mut SecurityContext,
        redirect_after_logout: Option<&str>,
        presenter: &P,
    ) -> Result<P::Output, AppError> {
        engine.logout(context);
        navigate(redirect_after_logout, presenter)
    }

    /// React to a successful authentication attempt.
    ///
    /// Navigates to `redirect_after_login` when present and non-empty, to
    /// the index view otherwise. The intercepted request is not consulted.
    ///
    /// # Errors
    /// `UnsupportedRequestType` when the presenter cannot navigate the
    /// current request kind.
    pub fn on_authentication_success<P: Presenter>(
        &self,
        original_request: Option<&str>,
        redirect_after_login: Option<&str>,
        presenter: &P,
    ) -> Result<P::Output, AppError> {
        if let Some(uri) = original_request {
            tracing::debug!(intercepted = %uri, "Ignoring intercepted request");
        }
        navigate(redirect_after_login, presenter)
    }

    /// React to a failed authentication attempt.
    ///
    /// Produces exactly one translated notification at error severity and
    /// hands it to the sink. The code is the failure's own code, or the
    /// fallback code when the failure carries no structured cause.
    ///
    /// # Errors
    /// Translation lookup failures propagate unchanged.
    pub fn on_authentication_failure(
        &self,
        failure: &AuthFailure,
        notifications: &mut dyn NotificationSink,
    ) -> Result<(), AppError> {
        let title = self.translate(FAILURE_TITLE_LABEL)?;
        let message = self.translate(FAILURE_MESSAGE_LABEL)?;
        notifications.push(FlashMessage::error(title, message, failure.code()));
        Ok(())
    }

    /// Whether the engine should emit its own generic technical-failure
    /// notification. Always `false`: the translated notification from
    /// [`on_authentication_failure`](Self::on_authentication_failure) is
    /// the only one the visitor sees.
    pub fn emits_technical_error_notification(&self) -> bool {
        false
    }

    fn translate(&self, label_id: &str) -> Result<String, AppError> {
        self.translator.translate_by_id(
            label_id,
            &self.translation_source_name,
            &self.translation_package_key,
        )
    }
}

/// The navigation rule shared by login success and logout.
fn navigate<P: Presenter>(
    redirect_uri: Option<&str>,
    presenter: &P,
) -> Result<P::Output, AppError> {
    match redirect_uri {
        Some(uri) if !uri.is_empty() => presenter.redirect_to_uri(uri),
        _ => presenter.forward_to(INDEX_VIEW),
    }
}
