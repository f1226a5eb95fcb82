/// Account manager built on the whole-file record store
///
/// Every operation reloads the users collection from disk, mutates the
/// in-memory snapshot, and rewrites the whole document. Operations that span
/// two collections (account deletion cascading into history) issue two
/// independent saves with no cross-collection atomicity.
use crate::{
    account::{
        hash_password, username_eq, verify_password, Account, ProfileUpdate, UsageReport,
        USERS_COLLECTION,
    },
    error::{AppError, AppResult},
    history::HistoryLedger,
    store::JsonStore,
    validation,
};
use std::sync::Arc;

/// Account manager service
#[derive(Clone)]
pub struct AccountManager {
    store: Arc<JsonStore>,
    history: Arc<HistoryLedger>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(store: Arc<JsonStore>, history: Arc<HistoryLedger>) -> Self {
        Self { store, history }
    }

    /// Check a username/password pair against the users collection.
    ///
    /// Username match is case-insensitive. No lockout, no rate limiting.
    pub async fn validate_login(&self, username: &str, password: &str) -> AppResult<bool> {
        let users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;
        Ok(users
            .iter()
            .find(|u| username_eq(&u.username, username))
            .map(|u| verify_password(password, &u.password_hash))
            .unwrap_or(false))
    }

    /// Case-insensitive account lookup
    pub async fn get_account(&self, username: &str) -> AppResult<Option<Account>> {
        let users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;
        Ok(users.into_iter().find(|u| username_eq(&u.username, username)))
    }

    /// Whether the named account is an admin; false when absent
    pub async fn is_admin(&self, username: &str) -> AppResult<bool> {
        Ok(self
            .get_account(username)
            .await?
            .map(|u| u.is_admin)
            .unwrap_or(false))
    }

    /// All accounts, for the admin panel
    pub async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        self.store.load(USERS_COLLECTION).await
    }

    /// Apply a partial profile update: only supplied fields change
    pub async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> AppResult<String> {
        let mut users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;

        let position = users
            .iter()
            .position(|u| username_eq(&u.username, username))
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

        if let Some(ref email) = update.email {
            validation::validate_email(email)?;
            if users
                .iter()
                .any(|u| u.email == *email && !username_eq(&u.username, username))
            {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
        }

        let password_hash = match update.password {
            Some(ref password) => {
                validation::validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let user = &mut users[position];

        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }

        self.store.save(USERS_COLLECTION, &users).await?;
        Ok("Profile updated successfully".to_string())
    }

    /// Delete an account and cascade removal of its history entry.
    ///
    /// Two saves against two collections; a crash in between leaves an
    /// orphaned history entry.
    pub async fn delete_account(&self, acting_admin: &str, target: &str) -> AppResult<String> {
        if username_eq(acting_admin, target) {
            return Err(AppError::SelfActionForbidden(
                "Cannot delete your own account".to_string(),
            ));
        }

        let mut users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;
        let before = users.len();
        users.retain(|u| !username_eq(&u.username, target));

        if users.len() == before {
            return Err(AppError::NotFound(format!("User {} not found", target)));
        }

        self.store.save(USERS_COLLECTION, &users).await?;
        self.history.remove_user(target).await?;

        Ok(format!("User {} deleted", target))
    }

    /// Flip the admin flag on another account
    pub async fn toggle_admin(&self, acting_admin: &str, target: &str) -> AppResult<String> {
        if username_eq(acting_admin, target) {
            return Err(AppError::SelfActionForbidden(
                "Cannot change your own admin status".to_string(),
            ));
        }

        let mut users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;
        let user = users
            .iter_mut()
            .find(|u| username_eq(&u.username, target))
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", target)))?;

        user.is_admin = !user.is_admin;
        let status = if user.is_admin {
            "promoted to admin"
        } else {
            "demoted to regular user"
        };
        let message = format!("User {} {}", target, status);

        self.store.save(USERS_COLLECTION, &users).await?;
        Ok(message)
    }

    /// Zero the usage counter of one account
    pub async fn reset_usage(&self, target: &str) -> AppResult<String> {
        let mut users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;
        let user = users
            .iter_mut()
            .find(|u| username_eq(&u.username, target))
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", target)))?;

        user.usage_count = 0;
        self.store.save(USERS_COLLECTION, &users).await?;
        Ok(format!("Usage count reset for {}", target))
    }

    /// Zero the usage counters of every non-admin account.
    ///
    /// Never fails; reports distinctly whether anything was reset.
    pub async fn reset_all_usage(&self, _acting_admin: &str) -> AppResult<String> {
        let mut users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;
        let mut updated = false;

        for user in users.iter_mut().filter(|u| !u.is_admin) {
            user.usage_count = 0;
            updated = true;
        }

        if updated {
            self.store.save(USERS_COLLECTION, &users).await?;
            Ok("All non-admin usage counts reset".to_string())
        } else {
            Ok("No usage counts to reset".to_string())
        }
    }

    /// Count one prediction against an account.
    ///
    /// No-op for admins, and silently succeeds when the account is missing.
    pub async fn increment_usage(&self, username: &str) -> AppResult<()> {
        let mut users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;

        if let Some(user) = users
            .iter_mut()
            .find(|u| username_eq(&u.username, username) && !u.is_admin)
        {
            user.usage_count += 1;
            self.store.save(USERS_COLLECTION, &users).await?;
        }

        Ok(())
    }

    /// Usage reported to callers: admins are unlimited, missing accounts
    /// report zero
    pub async fn usage_count(&self, username: &str) -> AppResult<UsageReport> {
        Ok(match self.get_account(username).await? {
            Some(user) if user.is_admin => UsageReport::Unlimited,
            Some(user) => UsageReport::Count(user.usage_count),
            None => UsageReport::Count(0),
        })
    }

    /// Quota consult performed before an assessment is allowed
    pub async fn ensure_within_quota(&self, username: &str, limit: u32) -> AppResult<()> {
        if let Some(user) = self.get_account(username).await? {
            if !user.is_admin && user.usage_count >= limit {
                return Err(AppError::QuotaExceeded(
                    "Usage limit reached. Contact an administrator.".to_string(),
                ));
            }
        }
        Ok(())
    }
}
