use serde_json::json;

use super::models::Comment;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;

/// Comments for a post, newest first. A failed load degrades to an empty
/// list rather than failing the page.
pub async fn list_comments(gateway: &Gateway, post_id: &str) -> Vec<Comment> {
    match try_list_comments(gateway, post_id).await {
        Ok(comments) => comments,
        Err(e) => {
            tracing::warn!("comment load failed, showing none: {e}");
            Vec::new()
        }
    }
}

/// Comments for a post, failing loudly. The delete flow needs to tell "no
/// comments" apart from "could not list them".
pub async fn try_list_comments(gateway: &Gateway, post_id: &str) -> AppResult<Vec<Comment>> {
    gateway
        .from("comments")
        .eq("post_id", post_id)
        .order_desc("created_at")
        .select()
        .await
}

/// Add a comment. Anonymous commenting is allowed: `author_id` is the
/// current session's id when present, null otherwise. Whitespace-only
/// content is rejected before any remote call.
pub async fn add_comment(
    gateway: &Gateway,
    post_id: &str,
    author_id: Option<&str>,
    content: &str,
) -> AppResult<Comment> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("comment content is empty".into()));
    }

    gateway
        .from("comments")
        .insert(&json!({
            "post_id": post_id,
            "user_id": author_id,
            "content": trimmed,
        }))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn whitespace_comment_never_reaches_the_gateway() {
        // An unroutable gateway: any remote call would fail with Transport,
        // so a Validation error proves no call was issued.
        let gateway = Gateway::new("http://127.0.0.1:1", "key").unwrap();
        let err = add_comment(&gateway, "p1", None, "   \n\t ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
