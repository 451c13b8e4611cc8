//! Portal API
//!
//! Thin blocking HTTP clients for the pet-health portal.

pub mod login;
pub mod recommendations;

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::cookie::Jar;
use reqwest::StatusCode;
use thiserror::Error;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("Invalid username or password")]
    Rejected,

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

// Re-exports
pub use login::{LoginClient, LoginSubmission};
pub use recommendations::{Article, RecommendationsClient};

/// Backend the app talks to; implemented over HTTP in production
pub trait Portal: Send + Sync {
    /// Recommended articles; empty on any failure
    fn recommendations(&self) -> Vec<Article>;

    fn login(&self, submission: &LoginSubmission) -> ApiResult<()>;
}

pub struct HttpPortal {
    recommendations: RecommendationsClient,
    login: LoginClient,
}

impl HttpPortal {
    /// Both clients share one cookie jar, so the session cookie set at
    /// sign-in rides along with later requests
    pub fn new(base_url: &str, login_path: &str, timeout: Duration) -> ApiResult<Self> {
        let jar = Arc::new(Jar::default());
        Ok(Self {
            recommendations: RecommendationsClient::new(base_url, timeout, Arc::clone(&jar))?,
            login: LoginClient::new(base_url, login_path, timeout, jar)?,
        })
    }
}

impl Portal for HttpPortal {
    fn recommendations(&self) -> Vec<Article> {
        self.recommendations.fetch()
    }

    fn login(&self, submission: &LoginSubmission) -> ApiResult<()> {
        self.login.submit(submission)
    }
}

/// Shared client settings; cookies are read from and stored in `jar`
pub fn client_builder(timeout: Duration, jar: Arc<Jar>) -> ClientBuilder {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("petcare-cli/", env!("CARGO_PKG_VERSION")))
        .cookie_provider(jar)
}

/// Join a base URL and an absolute path without doubling slashes
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::recommendations::RECOMMENDATIONS_PATH;

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("http://localhost:8000/", RECOMMENDATIONS_PATH),
            "http://localhost:8000/api/v1/article_recommendations/"
        );
        assert_eq!(
            endpoint("https://pets.example", "accounts/login/"),
            "https://pets.example/accounts/login/"
        );
    }
}
