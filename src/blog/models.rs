use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Display label used whenever an author cannot be resolved. A raw author
/// id is never rendered.
pub const ANONYMOUS: &str = "anonymous";

/// The display-facing user record, distinct from the authentication
/// account. Created lazily on first reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub content: String,
    #[serde(default)]
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// The gateway stores absent text as NULL; render it as empty.
fn null_to_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A post joined with its resolved author name.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub author: Option<String>,
}

impl PostView {
    pub fn author_label(&self) -> &str {
        self.author.as_deref().unwrap_or(ANONYMOUS)
    }

    pub fn title_label(&self) -> &str {
        let title = self.post.title.trim();
        if title.is_empty() {
            "(untitled)"
        } else {
            title
        }
    }

    /// Content for the detail view; empty content gets a placeholder, not
    /// an error.
    pub fn content_or_placeholder(&self) -> &str {
        if self.post.content.trim().is_empty() {
            "(no content)"
        } else {
            &self.post.content
        }
    }

    /// Listing excerpt, truncated on a character boundary.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let content = self.post.content.trim();
        if content.is_empty() {
            return "(no content)".to_string();
        }
        let mut excerpt: String = content.chars().take(max_chars).collect();
        if content.chars().count() > max_chars {
            excerpt.push_str("...");
        }
        excerpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(author: Option<&str>, title: &str, content: &str) -> PostView {
        PostView {
            post: Post {
                id: "p1".into(),
                title: title.into(),
                content: content.into(),
                author_id: Some("a1".into()),
                created_at: Utc::now(),
                updated_at: None,
            },
            author: author.map(String::from),
        }
    }

    #[test]
    fn unresolved_author_renders_anonymous_not_id() {
        let v = view(None, "Hello", "body");
        assert_eq!(v.author_label(), ANONYMOUS);
        assert!(!v.author_label().contains("a1"));
    }

    #[test]
    fn resolved_author_renders_username() {
        let v = view(Some("alice"), "Hello", "body");
        assert_eq!(v.author_label(), "alice");
    }

    #[test]
    fn empty_content_gets_placeholder() {
        let v = view(None, "Hello", "");
        assert_eq!(v.content_or_placeholder(), "(no content)");
        assert_eq!(v.excerpt(150), "(no content)");
    }

    #[test]
    fn whitespace_content_gets_placeholder() {
        let v = view(None, "Hello", "   \n  ");
        assert_eq!(v.content_or_placeholder(), "(no content)");
    }

    #[test]
    fn blank_title_gets_placeholder() {
        let v = view(None, "  ", "body");
        assert_eq!(v.title_label(), "(untitled)");
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let body = "x".repeat(200);
        let v = view(None, "t", &body);
        let excerpt = v.excerpt(150);
        assert_eq!(excerpt.chars().count(), 153);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn short_content_is_not_truncated() {
        let v = view(None, "t", "short body");
        assert_eq!(v.excerpt(150), "short body");
    }

    #[test]
    fn post_deserializes_null_text_as_empty() {
        let body = r#"{
            "id": "p1",
            "title": "Hello",
            "content": null,
            "author_id": null,
            "created_at": "2026-01-02T03:04:05Z"
        }"#;
        let post: Post = serde_json::from_str(body).unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "");
        assert!(post.author_id.is_none());
        assert!(post.updated_at.is_none());
    }

    #[test]
    fn comment_deserializes_with_null_author() {
        let body = r#"{
            "id": "c1",
            "post_id": "p1",
            "user_id": null,
            "content": "nice post",
            "created_at": "2026-01-02T03:04:05Z"
        }"#;
        let comment: Comment = serde_json::from_str(body).unwrap();
        assert!(comment.user_id.is_none());
        assert_eq!(comment.content, "nice post");
    }
}
