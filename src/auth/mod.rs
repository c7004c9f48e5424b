pub mod store;

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::blog::models::Profile;
use crate::error::{AppError, AppResult};
use crate::gateway::auth::{AuthSession, AuthUser};
use crate::gateway::Gateway;
use store::SessionStore;

/// Point-in-time view of the authenticated identity, published to
/// observers on every session change.
///
/// `epoch` increases monotonically with each session change; consumers and
/// in-flight work use it to discard results from a superseded session.
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub epoch: u64,
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
}

impl AuthSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Resolved username, email local-part fallback, nothing otherwise.
    pub fn display_name(&self) -> Option<String> {
        if let Some(profile) = &self.profile {
            return Some(profile.username.clone());
        }
        self.user
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .map(default_username)
    }
}

/// Process-wide session/auth state: sign-up, sign-in, sign-out, and the
/// session-change subscription that keeps the identity display current.
pub struct SessionHolder {
    gateway: Arc<Gateway>,
    store: SessionStore,
    inner: Mutex<Inner>,
    tx: watch::Sender<AuthSnapshot>,
}

struct Inner {
    epoch: u64,
    session: Option<AuthSession>,
    profile: Option<Profile>,
}

impl SessionHolder {
    pub fn new(gateway: Arc<Gateway>, store: SessionStore) -> Self {
        let (tx, _) = watch::channel(AuthSnapshot::default());
        Self {
            gateway,
            store,
            inner: Mutex::new(Inner {
                epoch: 0,
                session: None,
                profile: None,
            }),
            tx,
        }
    }

    /// Observe session changes. The latest snapshot always wins; receivers
    /// never see a stale epoch after a newer one.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    /// Apply the session persisted by a previous run, if any.
    pub async fn restore(&self) {
        if let Some(session) = self.store.load() {
            self.apply_session(Some(session)).await;
        }
    }

    /// Create an account. Validation happens before any remote call; the
    /// profile insert afterwards is best-effort and never rolls back the
    /// account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm: &str,
        username: &str,
    ) -> AppResult<()> {
        validate_registration(email, password, confirm, username)?;

        let outcome = self.gateway.sign_up(email, password, username).await?;

        let row = Profile {
            id: outcome.user.id.clone(),
            username: username.trim().to_string(),
        };
        if let Err(e) = self
            .gateway
            .from("users")
            .upsert_ignore_duplicates(&row)
            .await
        {
            tracing::warn!("profile create after sign-up failed (account is fine): {e}");
        }

        Ok(())
    }

    /// Authenticate. On failure holder state is untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSnapshot> {
        let session = self.gateway.sign_in(email, password).await?;
        self.store.save(&session);
        self.apply_session(Some(session)).await;
        Ok(self.snapshot())
    }

    /// Invalidate the session. The remote revocation is best-effort; local
    /// state and the persisted session are cleared unconditionally.
    pub async fn sign_out(&self) {
        let signed_in = self.inner.lock().await.session.is_some();
        if signed_in {
            if let Err(e) = self.gateway.sign_out().await {
                tracing::warn!("remote sign-out failed, clearing local session anyway: {e}");
            }
        }
        self.store.clear();
        self.apply_session(None).await;
    }

    /// Session-change entry point: bumps the epoch, publishes the new
    /// identity immediately, then resolves the profile asynchronously. The
    /// profile commit re-checks the epoch so a fetch started under a
    /// superseded session is discarded, never applied.
    pub async fn apply_session(&self, session: Option<AuthSession>) {
        let (epoch, user) = {
            let mut inner = self.inner.lock().await;
            inner.epoch += 1;
            inner.session = session;
            inner.profile = None;
            self.gateway
                .set_bearer(inner.session.as_ref().map(|s| s.access_token.clone()));
            self.publish(&inner);
            (inner.epoch, inner.session.as_ref().map(|s| s.user.clone()))
        };

        let Some(user) = user else { return };

        let profile = match ensure_profile(&self.gateway, &user.id, user.email.as_deref()).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("profile resolution failed: {e}");
                None
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            tracing::debug!(
                stale = epoch,
                current = inner.epoch,
                "discarding profile from superseded session"
            );
            return;
        }
        inner.profile = profile;
        self.publish(&inner);
    }

    fn publish(&self, inner: &Inner) {
        self.tx.send_replace(AuthSnapshot {
            epoch: inner.epoch,
            user: inner.session.as_ref().map(|s| s.user.clone()),
            profile: inner.profile.clone(),
        });
    }
}

/// Fetch the profile for an account, lazily creating it from the email
/// local-part when absent. The create is an idempotent upsert: concurrent
/// lazy-creates for the same id never error the caller.
pub async fn ensure_profile(
    gateway: &Gateway,
    user_id: &str,
    email: Option<&str>,
) -> AppResult<Profile> {
    let existing: Vec<Profile> = gateway
        .from("users")
        .columns("id,username")
        .eq("id", user_id)
        .select()
        .await?;
    if let Some(profile) = existing.into_iter().next() {
        return Ok(profile);
    }

    let username = email.map(default_username).unwrap_or_else(|| "user".into());
    let row = Profile {
        id: user_id.to_string(),
        username: username.clone(),
    };
    gateway
        .from("users")
        .upsert_ignore_duplicates(&row)
        .await?;

    // Re-read in case a concurrent create won with a different name.
    let created: Vec<Profile> = gateway
        .from("users")
        .columns("id,username")
        .eq("id", user_id)
        .select()
        .await?;
    Ok(created.into_iter().next().unwrap_or(row))
}

/// Username synthesized from an email's local-part.
pub fn default_username(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default().trim();
    if local.is_empty() {
        "user".to_string()
    } else {
        local.to_string()
    }
}

fn validate_registration(
    email: &str,
    password: &str,
    confirm: &str,
    username: &str,
) -> AppResult<()> {
    if email.trim().is_empty() || password.is_empty() || confirm.is_empty() || username.trim().is_empty()
    {
        return Err(AppError::Validation("all fields are required".into()));
    }
    if password != confirm {
        return Err(AppError::Validation("passwords do not match".into()));
    }
    if password.len() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_is_rejected() {
        let err = validate_registration("a@b.c", "12345", "12345", "alice").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let err = validate_registration("a@b.c", "123456", "654321", "alice").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn missing_fields_are_rejected() {
        assert!(validate_registration("", "123456", "123456", "alice").is_err());
        assert!(validate_registration("a@b.c", "123456", "123456", "  ").is_err());
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration("a@b.c", "123456", "123456", "alice").is_ok());
    }

    #[tokio::test]
    async fn short_password_never_reaches_the_gateway() {
        // Unroutable gateway: a remote call would surface Transport, so the
        // Validation error proves the call was rejected locally.
        let gateway = Arc::new(Gateway::new("http://127.0.0.1:1", "key").unwrap());
        let store = SessionStore::new(std::env::temp_dir().join("quill-test-session.json"));
        let holder = SessionHolder::new(gateway, store);
        let err = holder
            .register("a@b.c", "123", "123", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn default_username_takes_email_local_part() {
        assert_eq!(default_username("alice@example.com"), "alice");
        assert_eq!(default_username("no-at-sign"), "no-at-sign");
        assert_eq!(default_username("@example.com"), "user");
    }

    #[test]
    fn empty_snapshot_has_no_display_name() {
        assert_eq!(AuthSnapshot::default().display_name(), None);
        assert!(!AuthSnapshot::default().is_signed_in());
    }

    #[test]
    fn display_name_prefers_profile_over_email() {
        let snapshot = AuthSnapshot {
            epoch: 1,
            user: Some(AuthUser {
                id: "u1".into(),
                email: Some("alice@example.com".into()),
            }),
            profile: Some(Profile {
                id: "u1".into(),
                username: "wonderland".into(),
            }),
        };
        assert_eq!(snapshot.display_name().as_deref(), Some("wonderland"));
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let snapshot = AuthSnapshot {
            epoch: 1,
            user: Some(AuthUser {
                id: "u1".into(),
                email: Some("alice@example.com".into()),
            }),
            profile: None,
        };
        assert_eq!(snapshot.display_name().as_deref(), Some("alice"));
    }
}
