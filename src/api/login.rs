//! Login Submission
//!
//! Posts credentials to the portal's server-rendered login endpoint.
//!
//! The endpoint answers a good sign-in with a redirect away from the login
//! page and a bad one by re-rendering the form (200), so redirects are not
//! followed and the status decides the outcome.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::cookie::Jar;
use reqwest::header::{LOCATION, REFERER};
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};

use super::{client_builder, endpoint, ApiError, ApiResult};

/// Form field carrying the anti-forgery token
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Validated form contents ready to post
pub struct LoginSubmission {
    pub username: String,
    pub password: SecretString,
    pub csrf_token: String,
}

impl fmt::Debug for LoginSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginSubmission")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

pub struct LoginClient {
    http: Client,
    url: String,
}

impl LoginClient {
    pub fn new(base_url: &str, login_path: &str, timeout: Duration, jar: Arc<Jar>) -> ApiResult<Self> {
        Ok(Self {
            http: client_builder(timeout, jar).redirect(Policy::none()).build()?,
            url: endpoint(base_url, login_path),
        })
    }

    /// Post the form. Only a redirect away from the login page signs in.
    pub fn submit(&self, submission: &LoginSubmission) -> ApiResult<()> {
        let params = [
            ("username", submission.username.as_str()),
            ("password", submission.password.expose_secret()),
            (CSRF_FIELD, submission.csrf_token.as_str()),
        ];

        let response = self
            .http
            .post(&self.url)
            .header(REFERER, &self.url)
            .form(&params)
            .send()?;

        tracing::debug!(user = %submission.username, status = %response.status(), "login response");
        let outcome = login_outcome(&response);
        match &outcome {
            Ok(()) => tracing::info!("login accepted"),
            Err(e) => tracing::warn!(error = %e, "login rejected"),
        }
        outcome
    }
}

fn login_outcome(response: &Response) -> ApiResult<()> {
    let status = response.status();

    if status.is_redirection() {
        let login_url = response.url();
        let target = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| login_url.join(location).ok());

        return match target {
            Some(target) if target.path() != login_url.path() => Ok(()),
            _ => Err(ApiError::Rejected),
        };
    }

    // The form came back, with errors
    if status.is_success() {
        return Err(ApiError::Rejected);
    }

    Err(ApiError::Status(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    use crate::api::test_server::{closed_port_url, serve_once, serve_with_headers};

    const TIMEOUT: Duration = Duration::from_secs(5);
    const LOGIN_PATH: &str = "/accounts/login/";

    fn submission() -> LoginSubmission {
        LoginSubmission {
            username: "mia@example.com".to_string(),
            password: SecretString::from("tabby&co".to_string()),
            csrf_token: "tok123".to_string(),
        }
    }

    fn client(base: &str) -> LoginClient {
        LoginClient::new(base, LOGIN_PATH, TIMEOUT, Arc::default()).unwrap()
    }

    #[test]
    fn test_submit_posts_form_fields() {
        let (base, server) = serve_with_headers("302 Found", &[("Location", "/dashboard/")], "");

        client(&base).submit(&submission()).unwrap();
        let captured = server.join().unwrap();

        assert_eq!(captured.request_line, "POST /accounts/login/ HTTP/1.1");
        assert!(captured
            .headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case("content-type: application/x-www-form-urlencoded")));
        assert_eq!(
            captured.body,
            "username=mia%40example.com&password=tabby%26co&csrfmiddlewaretoken=tok123"
        );
    }

    #[test]
    fn test_rerendered_form_is_rejected() {
        let page = r#"<form><ul class="errorlist"><li>Please enter a correct username and password.</li></ul></form>"#;
        let (base, server) = serve_once("200 OK", "text/html", page);

        let err = client(&base).submit(&submission()).unwrap_err();
        assert!(matches!(err, ApiError::Rejected));
        server.join().unwrap();
    }

    #[test]
    fn test_redirect_back_to_login_is_rejected() {
        let (base, server) =
            serve_with_headers("302 Found", &[("Location", "/accounts/login/?next=/")], "");

        assert!(matches!(client(&base).submit(&submission()), Err(ApiError::Rejected)));
        server.join().unwrap();
    }

    #[test]
    fn test_redirect_without_location_is_rejected() {
        let (base, server) = serve_with_headers("302 Found", &[], "");

        assert!(matches!(client(&base).submit(&submission()), Err(ApiError::Rejected)));
        server.join().unwrap();
    }

    #[test]
    fn test_session_cookie_is_kept() {
        let (base, server) = serve_with_headers(
            "302 Found",
            &[("Location", "/"), ("Set-Cookie", "sessionid=abc123; Path=/")],
            "",
        );
        let jar = Arc::new(Jar::default());
        let client = LoginClient::new(&base, LOGIN_PATH, TIMEOUT, Arc::clone(&jar)).unwrap();

        client.submit(&submission()).unwrap();
        server.join().unwrap();

        let url = reqwest::Url::parse(&base).unwrap();
        let cookies = jar.cookies(&url).unwrap();
        assert!(cookies.to_str().unwrap().contains("sessionid=abc123"));
    }

    #[test]
    fn test_submit_rejected_status() {
        let (base, server) = serve_once("403 Forbidden", "text/html", "CSRF verification failed");

        let err = client(&base).submit(&submission()).unwrap_err();
        assert!(matches!(err, ApiError::Status(s) if s.as_u16() == 403));
        server.join().unwrap();
    }

    #[test]
    fn test_submit_unreachable() {
        assert!(matches!(client(&closed_port_url()).submit(&submission()), Err(ApiError::Http(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", submission());
        assert!(!rendered.contains("tabby"));
        assert!(rendered.contains("mia@example.com"));
    }
}
