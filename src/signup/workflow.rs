/// Signup workflow implementation over the whole-file record store
use crate::{
    account::{hash_password, username_eq, Account, USERS_COLLECTION},
    error::{AppError, AppResult},
    mailer::Mailer,
    signup::{PendingSignup, PendingSummary, CONFIRMATION_WINDOW_HOURS, PENDING_COLLECTION},
    store::JsonStore,
    validation,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Signup workflow service
#[derive(Clone)]
pub struct SignupWorkflow {
    store: Arc<JsonStore>,
    mailer: Arc<Mailer>,
    base_url: String,
}

impl SignupWorkflow {
    /// Create a new signup workflow
    pub fn new(store: Arc<JsonStore>, mailer: Arc<Mailer>, base_url: String) -> Self {
        Self {
            store,
            mailer,
            base_url,
        }
    }

    /// Record a signup request and send the confirmation email.
    ///
    /// The username must not collide (case-insensitively) with any pending
    /// or active record, and the email must not collide exactly. A stale
    /// expired pending record still counts as a collision; an admin has to
    /// reject it before the name can be requested again. The token is the
    /// sole secret gating activation, so it is a freshly generated 128-bit
    /// random identifier.
    ///
    /// A mail failure is surfaced to the caller, but the stored pending
    /// record is kept: the admin can still approve it by hand.
    pub async fn request_signup(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> AppResult<String> {
        validation::validate_username(username)?;
        validation::validate_password(password)?;
        validation::validate_email(email)?;

        let mut pending: Vec<PendingSignup> = self.store.load(PENDING_COLLECTION).await?;
        if pending
            .iter()
            .any(|p| username_eq(&p.username, username) || p.email == email)
        {
            return Err(AppError::Conflict(
                "Username or email already pending confirmation".to_string(),
            ));
        }

        let users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;
        if users
            .iter()
            .any(|u| username_eq(&u.username, username) || u.email == email)
        {
            return Err(AppError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let token = Uuid::new_v4().to_string();
        pending.push(PendingSignup {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            email: email.to_string(),
            token: token.clone(),
            requested_at: Utc::now(),
        });
        self.store.save(PENDING_COLLECTION, &pending).await?;
        tracing::info!("Stored pending signup for {}", username);

        self.mailer
            .send_confirmation_email(email, username, &token, &self.base_url)
            .await?;

        Ok(token)
    }

    /// Confirm a pending signup with its emailed token and promote it to a
    /// full account.
    ///
    /// An expired record is reported but kept in the pending collection;
    /// only confirmation or an admin decision removes it.
    pub async fn confirm(&self, username: &str, token: &str) -> AppResult<String> {
        let mut pending: Vec<PendingSignup> = self.store.load(PENDING_COLLECTION).await?;

        let index = pending
            .iter()
            .position(|p| username_eq(&p.username, username) && p.token == token)
            .ok_or_else(|| {
                tracing::warn!("Invalid confirmation for {}", username);
                AppError::InvalidCredential("Invalid username or token".to_string())
            })?;

        let age = Utc::now() - pending[index].requested_at;
        if age > Duration::hours(CONFIRMATION_WINDOW_HOURS) {
            tracing::warn!("Expired confirmation token for {}", username);
            return Err(AppError::Expired("Confirmation token expired".to_string()));
        }

        self.promote(&pending[index]).await?;

        pending.remove(index);
        self.store.save(PENDING_COLLECTION, &pending).await?;

        tracing::info!("Confirmed signup for {}", username);
        Ok("Account confirmed".to_string())
    }

    /// Admin shortcut: promote a pending signup without token or expiry
    /// checks
    pub async fn approve(&self, _acting_admin: &str, target: &str) -> AppResult<String> {
        let mut pending: Vec<PendingSignup> = self.store.load(PENDING_COLLECTION).await?;

        let index = pending
            .iter()
            .position(|p| username_eq(&p.username, target))
            .ok_or_else(|| AppError::NotFound(format!("Pending user {} not found", target)))?;

        self.promote(&pending[index]).await?;

        pending.remove(index);
        self.store.save(PENDING_COLLECTION, &pending).await?;

        Ok(format!("User {} approved", target))
    }

    /// Admin shortcut: discard a pending signup
    pub async fn reject(&self, _acting_admin: &str, target: &str) -> AppResult<String> {
        let mut pending: Vec<PendingSignup> = self.store.load(PENDING_COLLECTION).await?;

        let index = pending
            .iter()
            .position(|p| username_eq(&p.username, target))
            .ok_or_else(|| AppError::NotFound(format!("Pending user {} not found", target)))?;

        pending.remove(index);
        self.store.save(PENDING_COLLECTION, &pending).await?;

        Ok(format!("User {} rejected", target))
    }

    /// Pending signups for the admin panel
    pub async fn pending(&self) -> AppResult<Vec<PendingSummary>> {
        let pending: Vec<PendingSignup> = self.store.load(PENDING_COLLECTION).await?;
        Ok(pending.iter().map(PendingSummary::from).collect())
    }

    /// Promote a pending record into the users collection, re-checking
    /// uniqueness against accounts created since the signup request
    async fn promote(&self, pending: &PendingSignup) -> AppResult<()> {
        let mut users: Vec<Account> = self.store.load(USERS_COLLECTION).await?;

        if users
            .iter()
            .any(|u| username_eq(&u.username, &pending.username) || u.email == pending.email)
        {
            return Err(AppError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        users.push(Account {
            username: pending.username.clone(),
            password_hash: pending.password_hash.clone(),
            email: pending.email.clone(),
            is_admin: false,
            usage_count: 0,
        });
        self.store.save(USERS_COLLECTION, &users).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountManager, UsageReport};
    use crate::history::HistoryLedger;
    use tempfile::tempdir;

    async fn setup() -> (tempfile::TempDir, SignupWorkflow, Arc<JsonStore>) {
        let dir = tempdir().unwrap();
        let store = Arc::new(JsonStore::open(dir.path()).await.unwrap());
        let mailer = Arc::new(Mailer::new(None).unwrap());
        let workflow = SignupWorkflow::new(
            Arc::clone(&store),
            mailer,
            "http://localhost:8080".to_string(),
        );
        (dir, workflow, store)
    }

    fn accounts(store: &Arc<JsonStore>) -> AccountManager {
        let history = Arc::new(HistoryLedger::new(Arc::clone(store)));
        AccountManager::new(Arc::clone(store), history)
    }

    #[tokio::test]
    async fn test_request_issues_unique_tokens() {
        let (_dir, workflow, store) = setup().await;

        let token_a = workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap();
        let token_b = workflow
            .request_signup("bob", "secret-pass", "bob@example.com")
            .await
            .unwrap();

        assert_ne!(token_a, token_b);

        let pending: Vec<PendingSignup> = store.load(PENDING_COLLECTION).await.unwrap();
        assert_eq!(pending.len(), 2);
        // Cleartext never reaches the pending store
        assert!(pending.iter().all(|p| p.password_hash != "secret-pass"));
    }

    #[tokio::test]
    async fn test_request_conflicts_with_pending_and_active() {
        let (_dir, workflow, store) = setup().await;

        workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap();

        // Same username, different case, different email
        let err = workflow
            .request_signup("ALICE", "secret-pass", "other@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Same email against an active account
        store
            .save(
                USERS_COLLECTION,
                &[Account {
                    username: "carol".to_string(),
                    password_hash: hash_password("secret-pass").unwrap(),
                    email: "carol@example.com".to_string(),
                    is_admin: false,
                    usage_count: 0,
                }],
            )
            .await
            .unwrap();
        let err = workflow
            .request_signup("dave", "secret-pass", "carol@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_confirm_promotes_to_account() {
        let (_dir, workflow, store) = setup().await;
        let manager = accounts(&store);

        let token = workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap();

        // Username match is case-insensitive, token match is exact
        workflow.confirm("ALICE", &token).await.unwrap();

        let account = manager.get_account("alice").await.unwrap().unwrap();
        assert!(!account.is_admin);
        assert_eq!(account.usage_count, 0);
        assert_eq!(
            manager.usage_count("alice").await.unwrap(),
            UsageReport::Count(0)
        );
        assert!(manager.validate_login("alice", "secret-pass").await.unwrap());

        let pending: Vec<PendingSignup> = store.load(PENDING_COLLECTION).await.unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_rejects_bad_token() {
        let (_dir, workflow, _store) = setup().await;

        workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap();

        let err = workflow.confirm("alice", "wrong-token").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential(_)));

        let err = workflow.confirm("ghost", "wrong-token").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn test_expired_token_is_kept_and_blocks_rerequest() {
        let (_dir, workflow, store) = setup().await;

        let stale = PendingSignup {
            username: "alice".to_string(),
            password_hash: hash_password("secret-pass").unwrap(),
            email: "alice@example.com".to_string(),
            token: "stale-token".to_string(),
            requested_at: Utc::now() - Duration::hours(CONFIRMATION_WINDOW_HOURS + 1),
        };
        store.save(PENDING_COLLECTION, &[stale]).await.unwrap();

        let err = workflow.confirm("alice", "stale-token").await.unwrap_err();
        assert!(matches!(err, AppError::Expired(_)));

        // The stale record stays and a fresh request for the same name
        // collides with it
        let pending: Vec<PendingSignup> = store.load(PENDING_COLLECTION).await.unwrap();
        assert_eq!(pending.len(), 1);

        let err = workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_confirm_detects_account_created_meanwhile() {
        let (_dir, workflow, store) = setup().await;

        let token = workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap();

        // An account with the same username appears before confirmation
        store
            .save(
                USERS_COLLECTION,
                &[Account {
                    username: "Alice".to_string(),
                    password_hash: hash_password("other-pass").unwrap(),
                    email: "elsewhere@example.com".to_string(),
                    is_admin: false,
                    usage_count: 0,
                }],
            )
            .await
            .unwrap();

        let err = workflow.confirm("alice", &token).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_approve_skips_token_check() {
        let (_dir, workflow, store) = setup().await;
        let manager = accounts(&store);

        workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap();

        workflow.approve("root", "alice").await.unwrap();
        assert!(manager.get_account("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_reject_reports_not_found() {
        let (_dir, workflow, _store) = setup().await;

        workflow
            .request_signup("alice", "secret-pass", "alice@example.com")
            .await
            .unwrap();

        workflow.reject("root", "alice").await.unwrap();
        let err = workflow.reject("root", "alice").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
