/// Request authentication helpers
///
/// There are no session tokens: every authenticated request carries HTTP
/// Basic credentials which are checked against the users collection.
use crate::{
    account::Account,
    context::AppContext,
    error::{AppError, AppResult},
};
use axum_extra::headers::authorization::Basic;

/// Authenticate the request's Basic credentials and return the account
pub async fn require_user(ctx: &AppContext, credentials: &Basic) -> AppResult<Account> {
    let username = credentials.username();

    if !ctx
        .accounts
        .validate_login(username, credentials.password())
        .await?
    {
        return Err(AppError::InvalidCredential(
            "Invalid username or password".to_string(),
        ));
    }

    ctx.accounts
        .get_account(username)
        .await?
        .ok_or_else(|| AppError::InvalidCredential("Invalid username or password".to_string()))
}

/// Authenticate and additionally require the admin role
pub async fn require_admin(ctx: &AppContext, credentials: &Basic) -> AppResult<Account> {
    let account = require_user(ctx, credentials).await?;

    if !account.is_admin {
        return Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }

    Ok(account)
}
