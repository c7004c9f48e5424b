use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Gateway;
use crate::error::{AppError, AppResult};

/// Identity issued by the auth service. The credential itself is opaque to
/// this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Sign-up may or may not return a session, depending on whether the
/// gateway requires email confirmation.
#[derive(Debug)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

impl Gateway {
    /// `auth.signUp`: create an account, carrying the requested username as
    /// signup metadata.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> AppResult<SignUpOutcome> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "username": username },
        });
        let response: SignUpResponse = self
            .auth_call(Method::POST, "auth/v1/signup", Some(&body))
            .await?
            .json()
            .await?;
        Ok(match response {
            SignUpResponse::Session(session) => SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpResponse::User(user) => SignUpOutcome {
                user,
                session: None,
            },
        })
    }

    /// `auth.signIn`: password-grant authentication.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let body = json!({ "email": email, "password": password });
        let session = self
            .auth_call(
                Method::POST,
                "auth/v1/token?grant_type=password",
                Some(&body),
            )
            .await?
            .json()
            .await?;
        Ok(session)
    }

    /// `auth.signOut`: revoke the current session server-side.
    pub async fn sign_out(&self) -> AppResult<()> {
        self.auth_call(Method::POST, "auth/v1/logout", None).await?;
        Ok(())
    }

    /// `auth.currentUser`: the identity behind the current bearer token.
    pub async fn current_user(&self) -> AppResult<AuthUser> {
        let user = self
            .auth_call(Method::GET, "auth/v1/user", None)
            .await?
            .json()
            .await?;
        Ok(user)
    }

    /// Unauthenticated reachability probe, used by diagnostics.
    pub async fn auth_reachable(&self) -> AppResult<()> {
        self.auth_call(Method::GET, "auth/v1/settings", None).await?;
        Ok(())
    }

    async fn auth_call(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> AppResult<reqwest::Response> {
        let url = self.endpoint(path);
        let mut builder = self.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = AppError::from_auth_response(status.as_u16(), &text);
            tracing::debug!(path, %status, "auth call failed: {err}");
            return Err(err);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_response_parses_session_shape() {
        let body = r#"{"access_token":"tok","refresh_token":"ref","user":{"id":"u1","email":"a@b.c"}}"#;
        match serde_json::from_str::<SignUpResponse>(body).unwrap() {
            SignUpResponse::Session(s) => {
                assert_eq!(s.access_token, "tok");
                assert_eq!(s.user.id, "u1");
            }
            SignUpResponse::User(_) => panic!("expected session shape"),
        }
    }

    #[test]
    fn signup_response_parses_bare_user_shape() {
        let body = r#"{"id":"u1","email":"a@b.c","confirmation_sent_at":"2026-01-01T00:00:00Z"}"#;
        match serde_json::from_str::<SignUpResponse>(body).unwrap() {
            SignUpResponse::User(u) => assert_eq!(u.id, "u1"),
            SignUpResponse::Session(_) => panic!("expected user shape"),
        }
    }
}
