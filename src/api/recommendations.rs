//! Article Recommendations
//!
//! Fetches recommended articles. Failures degrade to an empty list.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use serde::{Deserialize, Serialize};

use super::{client_builder, endpoint, ApiError, ApiResult};

pub const RECOMMENDATIONS_PATH: &str = "/api/v1/article_recommendations/";

/// Recommended article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: Option<u64>,
    pub title: String,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
}

impl Article {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Payload,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Decode `{ "data": { "articles": [...] } }`
pub fn parse_articles(body: &str) -> ApiResult<Vec<Article>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    Ok(envelope.data.articles)
}

pub struct RecommendationsClient {
    http: Client,
    url: String,
}

impl RecommendationsClient {
    pub fn new(base_url: &str, timeout: Duration, jar: Arc<Jar>) -> ApiResult<Self> {
        Ok(Self {
            http: client_builder(timeout, jar).build()?,
            url: endpoint(base_url, RECOMMENDATIONS_PATH),
        })
    }

    /// Fetch, surfacing every failure
    pub fn try_fetch(&self) -> ApiResult<Vec<Article>> {
        let response = self.http.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let body = response.text()?;
        parse_articles(&body)
    }

    /// Fetch, logging failures and returning an empty list instead
    pub fn fetch(&self) -> Vec<Article> {
        match self.try_fetch() {
            Ok(articles) => {
                tracing::info!(count = articles.len(), "loaded recommendations");
                articles
            }
            Err(e) => {
                tracing::error!(error = %e, url = %self.url, "failed to fetch recommendations");
                Vec::new()
            }
        }
    }
}
