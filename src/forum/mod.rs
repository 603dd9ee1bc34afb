//! Discussion-forum source for the run's shared context

pub mod reddit;

pub use reddit::RedditClient;

use crate::config::{ForumConfig, TimeFilter};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A first-level comment on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumComment {
    pub body: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub title: String,
    /// Primary source URL the post links to
    pub url: String,
    /// Canonical discussion-post URL
    pub permalink: String,
    pub score: i64,
    pub comments: Vec<ForumComment>,
}

/// What to fetch: the top `limit` posts of `subreddit` within `window`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopPostsQuery {
    pub subreddit: String,
    pub window: TimeFilter,
    pub limit: usize,
    /// First-level comments kept per post
    pub comment_limit: usize,
}

impl From<&ForumConfig> for TopPostsQuery {
    fn from(config: &ForumConfig) -> Self {
        Self {
            subreddit: config.subreddit.clone(),
            window: config.time_filter,
            limit: config.post_limit,
            comment_limit: config.comment_limit,
        }
    }
}

#[async_trait]
pub trait ForumProvider: Send + Sync {
    /// Top posts for the window, ranked by the provider, with comments
    /// already flattened to first level and truncated to `comment_limit`
    async fn top_posts(&self, query: &TopPostsQuery) -> Result<Vec<ForumPost>>;
}

/// Test double serving canned posts
#[derive(Debug, Clone, Default)]
pub struct MockForumProvider {
    posts: Vec<ForumPost>,
    failure: Option<String>,
}

impl MockForumProvider {
    pub fn new(posts: Vec<ForumPost>) -> Self {
        Self {
            posts,
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            posts: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ForumProvider for MockForumProvider {
    async fn top_posts(&self, query: &TopPostsQuery) -> Result<Vec<ForumPost>> {
        if let Some(message) = &self.failure {
            return Err(Error::External(message.clone()));
        }
        Ok(self
            .posts
            .iter()
            .take(query.limit)
            .cloned()
            .map(|mut post| {
                post.comments.truncate(query.comment_limit);
                post
            })
            .collect())
    }
}
