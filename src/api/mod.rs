/// HTTP API surface
///
/// Route handlers stay thin: authentication, then a call into the owning
/// manager or workflow, then a JSON view of the result.
pub mod middleware;

mod account;
mod admin;
mod assessment;
mod signup;

use crate::context::AppContext;
use axum::Router;
use serde::Serialize;

/// Generic action result carrying a human-readable message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build all API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(account::routes())
        .merge(signup::routes())
        .merge(assessment::routes())
        .merge(admin::routes())
}
