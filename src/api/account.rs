/// Session and profile endpoints
use crate::{
    account::{AccountView, LoginRequest, ProfileUpdate},
    api::{middleware, MessageResponse},
    context::AppContext,
    error::{AppError, AppResult},
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};

/// Build account routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/session", post(login))
        .route("/api/profile", get(get_profile).put(update_profile))
}

/// Login endpoint: validates credentials and returns the profile view
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AccountView>> {
    if !ctx
        .accounts
        .validate_login(&req.username, &req.password)
        .await?
    {
        return Err(AppError::InvalidCredential(
            "Invalid username or password".to_string(),
        ));
    }

    let account = ctx
        .accounts
        .get_account(&req.username)
        .await?
        .ok_or_else(|| AppError::InvalidCredential("Invalid username or password".to_string()))?;

    Ok(Json(AccountView::from(&account)))
}

/// Profile view endpoint
async fn get_profile(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
) -> AppResult<Json<AccountView>> {
    let account = middleware::require_user(&ctx, &credentials).await?;
    Ok(Json(AccountView::from(&account)))
}

/// Profile update endpoint: only supplied fields change
async fn update_profile(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(credentials)): TypedHeader<Authorization<Basic>>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<MessageResponse>> {
    let account = middleware::require_user(&ctx, &credentials).await?;

    if update.email.is_none() && update.password.is_none() {
        return Err(AppError::Validation(
            "Provide at least one field to update".to_string(),
        ));
    }

    let message = ctx.accounts.update_profile(&account.username, update).await?;
    Ok(Json(MessageResponse::new(message)))
}
