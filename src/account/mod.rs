/// Account management
///
/// Owns the `users` collection: login validation, profile updates, admin
/// actions, and per-account usage counters.

mod manager;

pub use manager::AccountManager;

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Collection name for confirmed accounts
pub const USERS_COLLECTION: &str = "users";

/// Account record in the users collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub usage_count: u32,
}

/// Case-insensitive username comparison, shared by every collection keyed on
/// usernames
pub(crate) fn username_eq(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Hash a password with Argon2id and a fresh random salt
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
        Argon2,
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored hash; the comparison inside the
/// verifier is constant-time
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{
        password_hash::{PasswordHash, PasswordVerifier},
        Argon2,
    };

    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Usage reported to callers: admins are unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageReport {
    Unlimited,
    Count(u32),
}

impl std::fmt::Display for UsageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageReport::Unlimited => write!(f, "Unlimited"),
            UsageReport::Count(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for UsageReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UsageReport::Unlimited => serializer.serialize_str("Unlimited"),
            UsageReport::Count(n) => serializer.serialize_u32(*n),
        }
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Partial profile update: only supplied fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account view without credential material
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub usage: UsageReport,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        let usage = if account.is_admin {
            UsageReport::Unlimited
        } else {
            UsageReport::Count(account.usage_count)
        };
        Self {
            username: account.username.clone(),
            email: account.email.clone(),
            is_admin: account.is_admin,
            usage,
        }
    }
}
