use std::io::Write as _;

use super::Context;
use crate::blog::comments;
use crate::blog::posts::{self, CascadeDelete, CascadeError};
use crate::error::{AppError, AppResult};

/// Delete a post after confirmation, cascading to its comments first. A
/// failed comment listing leaves the count unknown; the cascade still runs
/// rather than being skipped as if the count were zero.
pub async fn run(ctx: &Context, id: &str, yes: bool) -> AppResult<()> {
    let comment_count = match comments::try_list_comments(&ctx.gateway, id).await {
        Ok(list) => Some(list.len()),
        Err(e) => {
            tracing::warn!("could not count comments before delete, cascading anyway: {e}");
            None
        }
    };

    if !yes {
        let scope = match comment_count {
            Some(n) => format!("its {n} comment(s)"),
            None => "any comments it has".to_string(),
        };
        let prompt = format!("Delete this post and {scope}? This cannot be undone.");
        if !confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    match posts::delete_post(&ctx.gateway, id, comment_count).await {
        Ok(CascadeDelete::Complete) => {
            println!("Post deleted.");
            Ok(())
        }
        Ok(CascadeDelete::CommentsFailed { reason }) => {
            println!("Post deleted, but its comments could not be removed: {reason}");
            Ok(())
        }
        Err(CascadeError::Post(e)) => Err(e),
        Err(e @ CascadeError::PostAfterComments(_)) => Err(AppError::Conflict(e.to_string())),
    }
}

fn confirm(prompt: &str) -> AppResult<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout()
        .flush()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
