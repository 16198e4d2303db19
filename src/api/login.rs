//! Login and logout endpoints
//!
//! The pipeline driver: runs authentication attempts through the engine,
//! hands the outcome to the login flow, and turns its decisions into HTTP.

use axum::{
    Router,
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;

use super::presenter::WebPresenter;
use crate::AppState;
use crate::auth::session::SESSION_COOKIE;
use crate::auth::{
    AuthenticationOutcome, Credentials, LoginView, Session, VisitorContext, create_session_token,
};
use crate::error::AppError;
use crate::notify::{FlashBucket, FlashMessage, NotificationSink, Severity, take_flashes};

/// Create login router
///
/// Routes:
/// - GET /login - Login form
/// - POST /login - Run one authentication attempt
/// - POST /logout - Invalidate the session
pub fn login_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form))
        .route("/login", post(authenticate))
        .route("/logout", post(logout))
}

// =============================================================================
// Login Form
// =============================================================================

#[derive(Debug, Deserialize)]
struct LoginPageQuery {
    redirect_after_login: Option<String>,
}

/// GET /login
///
/// Renders the login form. Shows the signed-in account when the visitor
/// already has a valid session, displays pending flash notifications, and
/// threads the redirect argument from the query string into the form.
async fn login_form(
    State(state): State<AppState>,
    VisitorContext(context): VisitorContext,
    Query(query): Query<LoginPageQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let view = state.flow.show_login_form(&context);
    let (flashes, jar) = take_flashes(jar);

    let page = render_login_page(&view, &flashes, query.redirect_after_login.as_deref());
    Ok((jar, Html(page)).into_response())
}

// =============================================================================
// Authentication
// =============================================================================

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    redirect_after_login: Option<String>,
}

/// POST /login
///
/// Drives one authentication attempt end to end:
/// 1. Ask the engine for the outcome
/// 2. Success: establish the session, let the flow pick the destination
/// 3. Failure: collect the flow's notification, return to the form
async fn authenticate(
    State(state): State<AppState>,
    VisitorContext(mut context): VisitorContext,
    headers: HeaderMap,
    jar: CookieJar,
    axum::extract::Form(form): axum::extract::Form<LoginForm>,
) -> Result<Response, AppError> {
    let credentials = Credentials {
        username: form.username,
        password: form.password,
    };
    let presenter = WebPresenter::from_request(&state.config.server, &headers);
    let secure = state.config.should_use_secure_cookies();

    let outcome = state.engine.authenticate(&credentials)?;
    match outcome {
        AuthenticationOutcome::Success(account) => {
            let session = Session::new(account.clone(), state.config.auth.session_max_age);
            let token = create_session_token(&session, &state.config.auth.session_secret)?;
            state.engine.establish(&mut context, account);

            let redirect = state.flow.on_authentication_success(
                None,
                form.redirect_after_login.as_deref(),
                &presenter,
            )?;

            let jar = jar.add(session_cookie(token, secure));
            Ok((jar, redirect).into_response())
        }
        AuthenticationOutcome::Failure(failure) => {
            let mut flashes = FlashBucket::new();
            state.flow.on_authentication_failure(&failure, &mut flashes)?;

            // The engine's generic technical notice stays disabled in
            // favor of the translated notification above.
            if state.flow.emits_technical_error_notification() {
                flashes.push(FlashMessage::error(
                    "Authentication failed".to_string(),
                    "An error occurred while trying to authenticate".to_string(),
                    failure.code(),
                ));
            }

            let jar = flashes.store(jar, secure);
            let back = login_form_uri(form.redirect_after_login.as_deref());
            Ok((jar, axum::response::Redirect::to(&back)).into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

#[derive(Debug, Deserialize)]
struct LogoutForm {
    redirect_after_logout: Option<String>,
}

/// POST /logout
///
/// Invalidates the session and navigates to the redirect argument, or the
/// index view when none is given. Safe to call without a session.
async fn logout(
    State(state): State<AppState>,
    VisitorContext(mut context): VisitorContext,
    headers: HeaderMap,
    jar: CookieJar,
    axum::extract::Form(form): axum::extract::Form<LogoutForm>,
) -> Result<Response, AppError> {
    let presenter = WebPresenter::from_request(&state.config.server, &headers);

    let redirect = state.flow.handle_logout(
        &state.engine,
        &mut context,
        form.redirect_after_logout.as_deref(),
        &presenter,
    )?;

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    let jar = jar.remove(removal);

    Ok((jar, redirect).into_response())
}

// =============================================================================
// Helpers
// =============================================================================

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// URI of the login form, preserving the redirect argument across a
/// failed attempt.
fn login_form_uri(redirect_after_login: Option<&str>) -> String {
    match redirect_after_login {
        Some(uri) if !uri.is_empty() => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("redirect_after_login", uri)
                .finish();
            format!("/login?{query}")
        }
        _ => "/login".to_string(),
    }
}

/// Render the login page.
///
/// Inline HTML; all dynamic parts are escaped.
fn render_login_page(
    view: &LoginView<'_>,
    flashes: &[FlashMessage],
    redirect_after_login: Option<&str>,
) -> String {
    use html_escape::{encode_double_quoted_attribute, encode_text};

    let mut flash_html = String::new();
    for flash in flashes {
        let class = match flash.severity {
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        flash_html.push_str(&format!(
            r#"            <div class="flash flash-{class}"><strong>{}</strong> {}</div>
"#,
            encode_text(&flash.title),
            encode_text(&flash.message),
        ));
    }

    let body = match view.account {
        Some(account) => format!(
            r#"            <p>Signed in as <strong>{}</strong></p>
            <form method="post" action="/logout">
                <button type="submit">Sign out</button>
            </form>
"#,
            encode_text(account.label()),
        ),
        None => {
            let redirect_field = match redirect_after_login {
                Some(uri) if !uri.is_empty() => format!(
                    r#"                <input type="hidden" name="redirect_after_login" value="{}">
"#,
                    encode_double_quoted_attribute(uri),
                ),
                _ => String::new(),
            };
            format!(
                r#"            <form method="post" action="/login">
{redirect_field}                <label>Username <input type="text" name="username" autofocus></label>
                <label>Password <input type="password" name="password"></label>
                <button type="submit">Sign in</button>
            </form>
"#
            )
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign in</title></head>
<body>
    <main>
        <h1>Sign in</h1>
{flash_html}{body}    </main>
</body>
</html>
"#
    )
}
