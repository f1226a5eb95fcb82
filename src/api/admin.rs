/// Admin panel endpoints
///
/// Every handler re-verifies the caller's credentials and admin role against
/// the users collection before acting.
use crate::{
    account::AccountView,
    api::{middleware, MessageResponse},
    context::AppContext,
    error::AppResult,
    history::IllnessSummary,
    signup::PendingSummary,
};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:username", delete(delete_user))
        .route(
            "/api/admin/users/:username/toggle-admin",
            post(toggle_admin),
        )
        .route("/api/admin/users/:username/reset-usage", post(reset_usage))
        .route("/api/admin/users/:username/history", get(user_history))
        .route("/api/admin/usage/reset-all", post(reset_all_usage))
        .route("/api/admin/pending", get(list_pending))
        .route("/api/admin/pending/:username/approve", post(approve_pending))
        .route("/api/admin/pending/:username/reject", post(reject_pending))
}

/// List all accounts with their usage
async fn list_users(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
) -> AppResult<Json<Vec<AccountView>>> {
    middleware::require_admin(&ctx, &credentials).await?;
    let users = ctx.accounts.list_accounts().await?;
    Ok(Json(users.iter().map(AccountView::from).collect()))
}

/// Delete an account and its history
async fn delete_user(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(username): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let admin = middleware::require_admin(&ctx, &credentials).await?;
    let message = ctx.accounts.delete_account(&admin.username, &username).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Flip an account's admin flag
async fn toggle_admin(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(username): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let admin = middleware::require_admin(&ctx, &credentials).await?;
    let message = ctx.accounts.toggle_admin(&admin.username, &username).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Zero one account's usage counter
async fn reset_usage(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(username): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    middleware::require_admin(&ctx, &credentials).await?;
    let message = ctx.accounts.reset_usage(&username).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Zero every non-admin usage counter
async fn reset_all_usage(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
) -> AppResult<Json<MessageResponse>> {
    let admin = middleware::require_admin(&ctx, &credentials).await?;
    let message = ctx.accounts.reset_all_usage(&admin.username).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Any user's history, without payloads
async fn user_history(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<IllnessSummary>>> {
    middleware::require_admin(&ctx, &credentials).await?;
    let records = ctx.history.history_for(&username).await?;
    Ok(Json(records.iter().map(IllnessSummary::from).collect()))
}

/// List pending signups
async fn list_pending(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
) -> AppResult<Json<Vec<PendingSummary>>> {
    middleware::require_admin(&ctx, &credentials).await?;
    Ok(Json(ctx.signups.pending().await?))
}

/// Promote a pending signup without its token
async fn approve_pending(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(username): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let admin = middleware::require_admin(&ctx, &credentials).await?;
    let message = ctx.signups.approve(&admin.username, &username).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Discard a pending signup
async fn reject_pending(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Path(username): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let admin = middleware::require_admin(&ctx, &credentials).await?;
    let message = ctx.signups.reject(&admin.username, &username).await?;
    Ok(Json(MessageResponse::new(message)))
}
