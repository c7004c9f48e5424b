use super::Context;
use crate::blog::posts;
use crate::error::AppResult;

const EXCERPT_CHARS: usize = 150;

/// The home view: every post with its author label, date, and an excerpt.
pub async fn run(ctx: &Context) -> AppResult<()> {
    let views = posts::list_posts(&ctx.gateway).await?;

    if views.is_empty() {
        println!("No posts yet. Write the first one with `quill new --title ...`.");
        return Ok(());
    }

    for view in &views {
        println!("{}  {}", view.post.id, view.title_label());
        println!(
            "    by {} on {}",
            view.author_label(),
            view.post.created_at.format("%Y-%m-%d")
        );
        println!("    {}", view.excerpt(EXCERPT_CHARS));
        println!();
    }
    println!("{} post(s). `quill show <id>` to read one.", views.len());
    Ok(())
}
