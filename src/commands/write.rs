use super::Context;
use crate::blog::posts;
use crate::error::AppResult;

/// Publish a new post as the signed-in user.
pub async fn create(ctx: &Context, title: &str, content: &str) -> AppResult<()> {
    let user = ctx.require_user()?;
    let post = posts::create_post(
        &ctx.gateway,
        &user.id,
        user.email.as_deref(),
        title,
        content,
    )
    .await?;
    println!("Published. `quill show {}` to read it.", post.id);
    Ok(())
}

/// Edit an existing post. The current values are loaded first so a field
/// not overridden by a flag keeps what was already there.
pub async fn edit(
    ctx: &Context,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> AppResult<()> {
    ctx.require_user()?;

    let existing = posts::get_post(&ctx.gateway, id).await?;
    let title = title.unwrap_or(existing.post.title);
    let content = content.unwrap_or(existing.post.content);

    let post = posts::update_post(&ctx.gateway, id, &title, &content).await?;
    println!("Updated. `quill show {}` to read it.", post.id);
    Ok(())
}
