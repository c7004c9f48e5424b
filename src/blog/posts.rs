use std::collections::HashMap;

use chrono::Utc;
use serde_json::json;

use super::models::{Post, PostView, Profile};
use crate::auth::ensure_profile;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;

/// All posts, newest first, joined with their resolved author names.
///
/// Author resolution is one deduplicated batch lookup; if it fails the
/// posts are still returned with anonymous authorship.
pub async fn list_posts(gateway: &Gateway) -> AppResult<Vec<PostView>> {
    let posts: Vec<Post> = gateway
        .from("posts")
        .order_desc("created_at")
        .select()
        .await?;

    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids = distinct_author_ids(&posts);
    let mut usernames: HashMap<String, String> = HashMap::new();
    if !author_ids.is_empty() {
        match gateway
            .from("users")
            .columns("id,username")
            .is_in("id", &author_ids)
            .select::<Profile>()
            .await
        {
            Ok(profiles) => {
                usernames = profiles.into_iter().map(|p| (p.id, p.username)).collect();
            }
            Err(e) => tracing::warn!("author lookup failed, showing posts as anonymous: {e}"),
        }
    }

    Ok(posts
        .into_iter()
        .map(|post| {
            let author = post
                .author_id
                .as_ref()
                .and_then(|id| usernames.get(id).cloned());
            PostView { post, author }
        })
        .collect())
}

/// The distinct author ids referenced by a page of posts, first-seen order.
pub fn distinct_author_ids(posts: &[Post]) -> Vec<String> {
    let mut seen = Vec::new();
    for post in posts {
        if let Some(id) = &post.author_id {
            if !seen.contains(id) {
                seen.push(id.clone());
            }
        }
    }
    seen
}

/// One post by id. An empty result is NotFound, distinct from a transport
/// failure; author resolution is best-effort.
pub async fn get_post(gateway: &Gateway, id: &str) -> AppResult<PostView> {
    let post: Post = gateway.from("posts").eq("id", id).select_one().await?;

    let author = match &post.author_id {
        Some(author_id) => {
            match gateway
                .from("users")
                .columns("id,username")
                .eq("id", author_id)
                .select::<Profile>()
                .await
            {
                Ok(mut profiles) => profiles.pop().map(|p| p.username),
                Err(e) => {
                    tracing::warn!("author lookup failed, showing post as anonymous: {e}");
                    None
                }
            }
        }
        None => None,
    };

    Ok(PostView { post, author })
}

/// Create a post. The author's profile row is lazily created first so the
/// insert's foreign key can resolve; that step is best-effort and the
/// insert is attempted either way.
pub async fn create_post(
    gateway: &Gateway,
    author_id: &str,
    author_email: Option<&str>,
    title: &str,
    content: &str,
) -> AppResult<Post> {
    let title = require_title(title)?;

    if let Err(e) = ensure_profile(gateway, author_id, author_email).await {
        tracing::warn!("could not ensure author profile, inserting post anyway: {e}");
    }

    gateway
        .from("posts")
        .insert(&json!({
            "title": title,
            "content": content.trim(),
            "author_id": author_id,
        }))
        .await
}

/// Update a post's title and content.
pub async fn update_post(gateway: &Gateway, id: &str, title: &str, content: &str) -> AppResult<Post> {
    let title = require_title(title)?;

    gateway
        .from("posts")
        .eq("id", id)
        .update(&json!({
            "title": title,
            "content": content.trim(),
            "updated_at": Utc::now(),
        }))
        .await
}

fn require_title(title: &str) -> AppResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("a title is required".into()));
    }
    Ok(trimmed)
}

/// Outcome of a two-phase post delete that still removed the post.
#[derive(Debug, PartialEq, Eq)]
pub enum CascadeDelete {
    /// Comments (if any) and the post were both removed.
    Complete,
    /// The comment delete failed but the post was removed anyway.
    CommentsFailed { reason: String },
}

/// Failure of the essential post-delete step.
#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error("post delete failed: {0}")]
    Post(AppError),
    #[error(
        "post delete failed after its comments were already removed; \
         the data is now inconsistent: {0}"
    )]
    PostAfterComments(AppError),
}

/// Delete a post and, best-effort, its comments first. With a known count
/// of zero no comment-delete call is issued; an unknown count (None) still
/// cascades, since comments may exist. The post delete is the essential
/// step: its failure is always fatal, and a failure after the comments
/// were removed is reported as the inconsistency it is.
pub async fn delete_post(
    gateway: &Gateway,
    id: &str,
    comment_count: Option<usize>,
) -> Result<CascadeDelete, CascadeError> {
    let mut comments_removed = false;
    let mut comments_failure = None;

    if comment_count != Some(0) {
        match gateway.from("comments").eq("post_id", id).delete().await {
            Ok(()) => comments_removed = true,
            Err(e) => {
                tracing::warn!("comment cascade failed, still deleting the post: {e}");
                comments_failure = Some(e.to_string());
            }
        }
    }

    match gateway.from("posts").eq("id", id).delete().await {
        Ok(()) => Ok(match comments_failure {
            Some(reason) => CascadeDelete::CommentsFailed { reason },
            None => CascadeDelete::Complete,
        }),
        Err(e) if comments_removed => Err(CascadeError::PostAfterComments(e)),
        Err(e) => Err(CascadeError::Post(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(id: &str, author_id: Option<&str>) -> Post {
        Post {
            id: id.into(),
            title: "t".into(),
            content: "c".into(),
            author_id: author_id.map(String::from),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn distinct_author_ids_deduplicates() {
        let posts = vec![
            post("p1", Some("a1")),
            post("p2", Some("a1")),
            post("p3", Some("a2")),
        ];
        assert_eq!(distinct_author_ids(&posts), vec!["a1", "a2"]);
    }

    #[test]
    fn distinct_author_ids_skips_anonymous_posts() {
        let posts = vec![post("p1", None), post("p2", Some("a1")), post("p3", None)];
        assert_eq!(distinct_author_ids(&posts), vec!["a1"]);
    }

    #[test]
    fn empty_title_is_rejected_locally() {
        assert!(matches!(
            require_title("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn title_is_trimmed() {
        assert_eq!(require_title("  Hello  ").unwrap(), "Hello");
    }
}
