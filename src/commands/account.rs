use super::Context;
use crate::auth::AuthSnapshot;
use crate::error::{AppError, AppResult};

pub async fn register(
    ctx: &Context,
    email: &str,
    username: &str,
    password: &str,
    confirm_password: &str,
) -> AppResult<()> {
    ctx.holder
        .register(email, password, confirm_password, username)
        .await?;
    println!("Account created. `quill login --email {email}` to sign in.");
    Ok(())
}

pub async fn login(ctx: &Context, email: &str, password: &str) -> AppResult<()> {
    let snapshot = ctx.holder.sign_in(email, password).await?;
    match snapshot.display_name() {
        Some(name) => println!("Signed in as {name}."),
        None => println!("Signed in."),
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> AppResult<()> {
    ctx.holder.sign_out().await;
    println!("Signed out.");
    Ok(())
}

/// The identity display: resolved username, email local-part, or the
/// account id as a last resort, plus a check that the gateway still
/// accepts the session token.
pub async fn whoami(ctx: &Context) -> AppResult<()> {
    let snapshot = ctx.holder.snapshot();
    let (Some(user), Some(name)) = (&snapshot.user, identity_name(&snapshot)) else {
        println!("Not signed in. `quill login` or `quill register` to get started.");
        return Ok(());
    };

    println!("{name}");
    if let Some(email) = &user.email {
        println!("  email: {email}");
    }
    println!("  id: {}", user.id);

    match ctx.gateway.current_user().await {
        Ok(_) => println!("  session: valid"),
        Err(AppError::Unauthorized) => {
            println!("  session: no longer accepted by the gateway (`quill login` to renew)")
        }
        Err(e) => tracing::warn!("session check failed: {e}"),
    }
    Ok(())
}

/// Name line for the identity display. An active session is always named,
/// falling back to the account id when neither profile nor email resolved.
fn identity_name(snapshot: &AuthSnapshot) -> Option<String> {
    let user = snapshot.user.as_ref()?;
    Some(snapshot.display_name().unwrap_or_else(|| user.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::models::Profile;
    use crate::gateway::auth::AuthUser;

    fn snapshot(email: Option<&str>, profile: Option<&str>) -> AuthSnapshot {
        AuthSnapshot {
            epoch: 1,
            user: Some(AuthUser {
                id: "u1".into(),
                email: email.map(String::from),
            }),
            profile: profile.map(|username| Profile {
                id: "u1".into(),
                username: username.into(),
            }),
        }
    }

    #[test]
    fn signed_out_snapshot_has_no_identity() {
        assert_eq!(identity_name(&AuthSnapshot::default()), None);
    }

    #[test]
    fn identity_prefers_profile_then_email() {
        assert_eq!(
            identity_name(&snapshot(Some("alice@example.com"), Some("wonderland"))).as_deref(),
            Some("wonderland")
        );
        assert_eq!(
            identity_name(&snapshot(Some("alice@example.com"), None)).as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn session_without_email_or_profile_still_has_an_identity() {
        // An active session must never be reported as signed out
        assert_eq!(identity_name(&snapshot(None, None)).as_deref(), Some("u1"));
    }
}
