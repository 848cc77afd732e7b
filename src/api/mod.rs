use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{cookie::Jar, Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::models::{decode_events, Event, UserInfo};

#[cfg(test)]
pub mod testing;

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unauthorized – sign in again or refresh the session cookie")]
    Unauthorized,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

// ─── Operations ─────────────────────────────────────────────────────────────

/// The server operations the dashboard depends on. Every call reports its
/// failure; deciding what to show instead is left to the caller.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;

    async fn get_user_info(&self) -> Result<UserInfo, ApiError>;

    async fn trigger_sync(&self) -> Result<(), ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    /// Starts the Google sign-in hand-off. The redirect happens outside this
    /// process, so nothing is awaited.
    fn initiate_google_login(&self) -> Result<(), ApiError>;
}

// ─── Client ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HttpEventsApi {
    client: Client,
    base_url: Url,
    has_session: bool,
}

impl HttpEventsApi {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .with_context(|| format!("Invalid API URL: {}", config.api_url))?;

        // The cookie store carries the session across calls, including any
        // cookie the server sets or clears along the way.
        let jar = Jar::default();
        if let Some(cookie) = &config.session_cookie {
            jar.add_cookie_str(cookie, &base_url);
        }

        let client = Client::builder()
            .user_agent(concat!("inbox-tui/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(Arc::new(jar))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            has_session: config.session_cookie.is_some(),
        })
    }

    /// Whether a session cookie was configured up front.
    pub fn has_session(&self) -> bool {
        self.has_session
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .with_context(|| format!("Bad API path: {path}"))
            .map_err(ApiError::Other)
    }

    /// Where the browser goes to start the Google sign-in hand-off.
    pub fn login_url(&self) -> Result<Url, ApiError> {
        self.url("/login/google")
    }

    async fn get(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.url(path)?;
        let resp = self.client.get(url).send().await?;
        Self::check_status(resp).await
    }

    async fn post(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.url(path)?;
        let resp = self.client.post(url).send().await?;
        Self::check_status(resp).await
    }

    async fn check_status(resp: Response) -> Result<Response, ApiError> {
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::Api {
                status: 403,
                message: "Forbidden – session is not allowed to do this".into(),
            }),
            s if s.is_client_error() || s.is_server_error() => {
                let status = s.as_u16();
                let message = resp.text().await.unwrap_or_default();
                Err(ApiError::Api { status, message })
            }
            _ => Ok(resp),
        }
    }
}

#[async_trait]
impl EventsApi for HttpEventsApi {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let resp = self.get("/api/events").await?;
        let raw: Vec<serde_json::Value> = resp.json().await?;
        Ok(decode_events(raw))
    }

    async fn get_user_info(&self) -> Result<UserInfo, ApiError> {
        let resp = self.get("/api/user").await?;
        Ok(resp.json().await?)
    }

    async fn trigger_sync(&self) -> Result<(), ApiError> {
        self.post("/api/events/sync").await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post("/logout").await?;
        Ok(())
    }

    fn initiate_google_login(&self) -> Result<(), ApiError> {
        let url = self.login_url()?;
        tracing::info!(%url, "opening google sign-in");
        open_in_browser(url.as_str()).map_err(ApiError::Other)
    }
}

/// Hands a URL to the platform opener. Links are never followed in-process.
pub fn open_in_browser(url: &str) -> Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    std::process::Command::new(opener)
        .arg(url)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch {opener}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> HttpEventsApi {
        let config = Config {
            api_url: url.into(),
            ..Config::default()
        };
        HttpEventsApi::new(&config).expect("client builds")
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = Config {
            api_url: "not a url".into(),
            ..Config::default()
        };
        assert!(HttpEventsApi::new(&config).is_err());
    }

    #[test]
    fn paths_resolve_against_base_url() {
        let api = client_for("http://localhost:9090");
        assert_eq!(
            api.url("/api/events").expect("joins").as_str(),
            "http://localhost:9090/api/events"
        );
        assert_eq!(
            api.login_url().expect("joins").as_str(),
            "http://localhost:9090/login/google"
        );
    }

    #[tokio::test]
    async fn unreachable_server_reports_network_error() {
        // Port 9 (discard) on loopback is closed on any sane test box.
        let api = client_for("http://127.0.0.1:9");
        match api.list_events().await {
            Err(ApiError::Network(_)) => {}
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
