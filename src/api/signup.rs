/// Signup and confirmation endpoints
use crate::{
    api::MessageResponse,
    context::AppContext,
    error::AppResult,
    signup::{ConfirmRequest, SignupRequest},
};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

/// Build signup routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/signup", post(request_signup))
        .route("/api/signup/confirm", post(confirm).get(confirm_link))
}

/// Signup request endpoint: stores the pending record and sends the
/// confirmation email. The token itself travels only by email.
async fn request_signup(
    State(ctx): State<AppContext>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<MessageResponse>> {
    ctx.signups
        .request_signup(&req.username, &req.password, &req.email)
        .await?;

    Ok(Json(MessageResponse::new(
        "Please check your email for a confirmation link",
    )))
}

/// Confirmation endpoint for tokens entered by hand
async fn confirm(
    State(ctx): State<AppContext>,
    Json(req): Json<ConfirmRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = ctx.signups.confirm(&req.username, &req.token).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Confirmation endpoint backing the emailed link
async fn confirm_link(
    State(ctx): State<AppContext>,
    Query(req): Query<ConfirmRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = ctx.signups.confirm(&req.username, &req.token).await?;
    Ok(Json(MessageResponse::new(message)))
}
