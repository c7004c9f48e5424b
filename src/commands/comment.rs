use super::Context;
use crate::blog::comments;
use crate::error::AppResult;

/// Add a comment, signed or anonymous, then show the refreshed count.
pub async fn run(ctx: &Context, post_id: &str, content: &str) -> AppResult<()> {
    let snapshot = ctx.holder.snapshot();
    let author_id = snapshot.user.as_ref().map(|u| u.id.as_str());

    comments::add_comment(&ctx.gateway, post_id, author_id, content).await?;

    let refreshed = comments::list_comments(&ctx.gateway, post_id).await;
    println!("Comment posted ({} total).", refreshed.len());
    Ok(())
}
