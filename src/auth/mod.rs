//! Visitor authentication
//!
//! Handles:
//! - The login flow (outcome handling, post-authentication navigation)
//! - The credential provider chain
//! - Session management

mod engine;
mod flow;
mod middleware;
mod outcome;
mod provider;
pub mod session;

pub use engine::{AuthenticationEngine, Credentials};
pub use flow::{
    FAILURE_MESSAGE_LABEL, FAILURE_TITLE_LABEL, INDEX_VIEW, LoginFlow, LoginView, Presenter,
};
pub use middleware::VisitorContext;
pub use outcome::{
    AuthFailure, AuthenticationOutcome, UNSPECIFIED_FAILURE_CODE, WRONG_CREDENTIALS_CODE,
};
pub use provider::{ConfigAccountProvider, CredentialProvider};
pub use session::{Account, Session, SecurityContext, create_session_token, verify_session_token};
