//! Shared-context loading: top forum posts rendered into one text blob

use super::types::SharedContext;
use crate::error::Result;
use crate::forum::{ForumPost, ForumProvider, TopPostsQuery};
use tracing::info;

/// Line separating post records
pub const RECORD_DELIMITER: &str = "==================================================";

/// Pure: render posts, in the given order, as delimited records.
///
/// Each record lists title, source URL, post URL, score and up to
/// `comment_limit` first-level comments with their scores.
pub fn format_context(posts: &[ForumPost], comment_limit: usize) -> String {
    let mut out = String::new();
    for post in posts {
        out.push_str(&format!("Title: {}\n", post.title));
        out.push_str(&format!("Source Data URL: {}\n", post.url));
        out.push_str(&format!("Reddit Post URL: {}\n", post.permalink));
        out.push_str(&format!("Score: {}\n", post.score));

        for (i, comment) in post.comments.iter().take(comment_limit).enumerate() {
            out.push_str(&format!("Top Comment {}: {}\n", i + 1, comment.body));
            out.push_str(&format!("Comment Score: {}\n\n", comment.score));
        }

        out.push_str(RECORD_DELIMITER);
        out.push_str("\n\n");
    }
    out
}

/// Fetch the top posts and build the run's shared context.
pub async fn load_context(
    provider: &dyn ForumProvider,
    query: &TopPostsQuery,
) -> Result<SharedContext> {
    let posts = provider.top_posts(query).await?;
    let text = format_context(&posts, query.comment_limit);
    info!(
        "Built shared context from {} posts ({} bytes)",
        posts.len(),
        text.len()
    );
    Ok(SharedContext::new(text))
}
