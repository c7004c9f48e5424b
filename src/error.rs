/// Failure kinds surfaced by gateway calls and local validation.
///
/// Validation errors are raised before any remote call is made; everything
/// else maps from a gateway response or a transport failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("gateway is not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("not found")]
    NotFound,

    #[error("unauthorized: sign in and try again")]
    Unauthorized,

    #[error("rejected by access policy: {0}")]
    Forbidden(String),

    #[error("constraint violation: {0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl AppError {
    /// Map a non-success table response to a failure kind.
    ///
    /// PostgREST reports SQL and policy errors as a JSON body with a `code`
    /// field; the codes the blog surface actually runs into are mapped to
    /// distinct kinds, everything else keeps the raw status and message.
    pub fn from_table_response(status: u16, body: &str) -> Self {
        let parsed: Option<TableErrorBody> = serde_json::from_str(body).ok();
        let code = parsed.as_ref().and_then(|b| b.code.as_deref());
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| body.trim().to_string());

        match (status, code) {
            (_, Some("PGRST116")) => AppError::NotFound,
            (_, Some("23503")) => AppError::Conflict(message),
            (_, Some("42501")) => AppError::Forbidden(message),
            (401, _) => AppError::Unauthorized,
            (403, _) => AppError::Forbidden(message),
            (404, _) => AppError::NotFound,
            _ => AppError::Gateway { status, message },
        }
    }

    /// Map a non-success auth response to a failure kind.
    pub fn from_auth_response(status: u16, body: &str) -> Self {
        let parsed: Option<AuthErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error))
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            401 => AppError::Unauthorized,
            403 => AppError::Forbidden(message),
            _ => AppError::Gateway { status, message },
        }
    }
}

#[derive(serde::Deserialize)]
struct TableErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// The auth service is not consistent about its error field name.
#[derive(serde::Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

pub type AppResult<T> = Result<T, AppError>;
