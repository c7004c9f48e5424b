use super::Context;
use crate::blog::{comments, posts};
use crate::error::AppResult;

/// The detail view: the post, then its comments newest-first. The two
/// fetches run concurrently; a failed comment load degrades to none.
pub async fn run(ctx: &Context, id: &str) -> AppResult<()> {
    let (view, comment_list) = futures::join!(
        posts::get_post(&ctx.gateway, id),
        comments::list_comments(&ctx.gateway, id)
    );
    let view = view?;

    println!("{}", view.title_label());
    println!(
        "by {} on {}",
        view.author_label(),
        view.post.created_at.format("%Y-%m-%d %H:%M")
    );
    println!();
    println!("{}", view.content_or_placeholder());
    println!();

    println!("Comments ({})", comment_list.len());
    if comment_list.is_empty() {
        println!("  No comments yet. `quill comment {id} <text>` to add one.");
    }
    for comment in &comment_list {
        println!(
            "  {}  {}",
            comment.created_at.format("%Y-%m-%d %H:%M"),
            comment.content
        );
    }
    Ok(())
}
