/// Pending-signup workflow
///
/// Owns the `pending_users` collection: signup requests wait here with a
/// confirmation token until they are confirmed by token, approved or rejected
/// by an admin, or go stale after the confirmation window.

mod workflow;

pub use workflow::SignupWorkflow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection name for unconfirmed signups
pub const PENDING_COLLECTION: &str = "pending_users";

/// Hours a confirmation token stays valid
pub const CONFIRMATION_WINDOW_HOURS: i64 = 24;

/// Pending signup record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSignup {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub token: String,
    pub requested_at: DateTime<Utc>,
}

/// Signup request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Confirmation request: username plus the emailed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub username: String,
    pub token: String,
}

/// Pending signup view for the admin panel, without credential material
#[derive(Debug, Clone, Serialize)]
pub struct PendingSummary {
    pub username: String,
    pub email: String,
    pub requested_at: DateTime<Utc>,
}

impl From<&PendingSignup> for PendingSummary {
    fn from(pending: &PendingSignup) -> Self {
        Self {
            username: pending.username.clone(),
            email: pending.email.clone(),
            requested_at: pending.requested_at,
        }
    }
}
