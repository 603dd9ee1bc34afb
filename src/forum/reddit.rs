//! Reddit client using application-only OAuth

use super::{ForumComment, ForumPost, ForumProvider, TopPostsQuery};
use crate::config::ForumConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";
const SHORTLINK_BASE: &str = "https://redd.it";

pub struct RedditClient {
    client: Client,
    auth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<String>>,
}

impl RedditClient {
    pub fn new(config: &ForumConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .clone()
            .ok_or_else(|| Error::Config("forum.client_id is required".to_string()))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or_else(|| Error::Config("forum.client_secret is required".to_string()))?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            auth_url: AUTH_URL.to_string(),
            api_url: API_URL.to_string(),
            client_id,
            client_secret,
            token: Mutex::new(None),
        })
    }

    pub fn with_endpoints(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.api_url = api_url.into();
        self
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let response = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = Self::json_or_error(response, "token").await?;

        debug!("Obtained Reddit application token");
        *cached = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.api_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        Self::json_or_error(response, path).await
    }

    async fn json_or_error<T: for<'de> Deserialize<'de>>(response: Response, what: &str) -> Result<T> {
        match response.status() {
            StatusCode::OK => response.json().await.map_err(|e| {
                Error::MalformedResponse(format!("Failed to parse Reddit {}: {}", what, e))
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth(format!(
                "Reddit rejected credentials ({})",
                response.status()
            ))),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(Error::External("Reddit rate limit exceeded".to_string()))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(Error::HttpStatus(format!("Reddit {} {}: {}", what, status, error_text)))
            }
        }
    }
}

#[async_trait]
impl ForumProvider for RedditClient {
    async fn top_posts(&self, query: &TopPostsQuery) -> Result<Vec<ForumPost>> {
        let listing = self
            .get(
                &format!("/r/{}/top", query.subreddit),
                &[
                    ("t", query.window.to_string()),
                    ("limit", query.limit.to_string()),
                    ("raw_json", "1".to_string()),
                ],
            )
            .await?;
        let summaries = parse_post_listing(listing)?;
        info!(
            "Fetched {} top posts from r/{} ({})",
            summaries.len(),
            query.subreddit,
            query.window
        );

        let mut posts = Vec::with_capacity(summaries.len());
        for summary in summaries.into_iter().take(query.limit) {
            let thread = self
                .get(
                    &format!("/comments/{}", summary.id),
                    &[
                        ("sort", "confidence".to_string()),
                        ("depth", "1".to_string()),
                        ("limit", query.comment_limit.to_string()),
                        ("raw_json", "1".to_string()),
                    ],
                )
                .await?;
            let comments = parse_first_level_comments(thread, query.comment_limit)?;
            posts.push(summary.into_post(comments));
        }
        Ok(posts)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct PostSummary {
    id: String,
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    score: i64,
}

impl PostSummary {
    fn into_post(self, comments: Vec<ForumComment>) -> ForumPost {
        ForumPost {
            permalink: format!("{}/{}", SHORTLINK_BASE, self.id),
            title: self.title,
            url: self.url,
            score: self.score,
            comments,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentData {
    #[serde(default)]
    body: String,
    #[serde(default)]
    score: i64,
}

fn parse_post_listing(value: Value) -> Result<Vec<PostSummary>> {
    let listing: Listing = serde_json::from_value(value)
        .map_err(|e| Error::MalformedResponse(format!("Unexpected post listing: {}", e)))?;
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| {
            serde_json::from_value(thing.data)
                .map_err(|e| Error::MalformedResponse(format!("Unexpected post: {}", e)))
        })
        .collect()
}

/// Comment threads come back as `[post listing, comment listing]`; only
/// `t1` children of the second listing count, `more` stubs are dropped.
fn parse_first_level_comments(value: Value, limit: usize) -> Result<Vec<ForumComment>> {
    let mut listings: Vec<Listing> = serde_json::from_value(value)
        .map_err(|e| Error::MalformedResponse(format!("Unexpected comment thread: {}", e)))?;
    if listings.len() < 2 {
        return Ok(Vec::new());
    }
    let comments = listings.swap_remove(1);

    comments
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .take(limit)
        .map(|thing| {
            serde_json::from_value::<CommentData>(thing.data)
                .map(|c| ForumComment {
                    body: c.body,
                    score: c.score,
                })
                .map_err(|e| Error::MalformedResponse(format!("Unexpected comment: {}", e)))
        })
        .collect()
}
