//! HTTP client for the playlist server's `/api` routes.

use std::future::Future;
use std::time::Duration;

use reqwest::{redirect, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::entry::{CurrentFileInfo, PlaylistEntry};
use crate::error::{ApiErrorBody, ClientError};

pub const PLAYLIST_PATH: &str = "/api/playlist";
pub const PLAYLIST_NEXT_PATH: &str = "/api/playlist/next";
pub const CURRENT_PATH: &str = "/api/current";
pub const ENQUEUE_PATH: &str = "/api/enqueue";

/// Read side of the server, as seen by the poller.
pub trait PlaylistSource: Send + Sync + 'static {
    fn fetch_playlist(&self) -> impl Future<Output = Result<Vec<PlaylistEntry>, ClientError>> + Send;

    fn fetch_current(&self) -> impl Future<Output = Result<CurrentFileInfo, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PlaylistClient {
    http: reqwest::Client,
    base_url: String,
}

impl PlaylistClient {
    /// `timeout` of `None` leaves requests unbounded.
    ///
    /// Redirects are never followed: the server answers form posts with
    /// `303 See Other` pointing at its HTML page, which we have no use for.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("npq/", env!("CARGO_PKG_VERSION")))
            .redirect(redirect::Policy::none());
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn playlist(&self) -> Result<Vec<PlaylistEntry>, ClientError> {
        self.get_json(PLAYLIST_PATH).await
    }

    pub async fn current(&self) -> Result<CurrentFileInfo, ClientError> {
        self.get_json(CURRENT_PATH).await
    }

    /// Append `url` to the server playlist.  Blank input never hits the wire.
    pub async fn enqueue(&self, url: &str) -> Result<(), ClientError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ClientError::EmptyUrl);
        }
        info!("enqueue {}", url);
        let resp = self
            .http
            .post(self.url(ENQUEUE_PATH))
            .form(&[("url", url)])
            .send()
            .await?;
        expect_action_ok(resp).await
    }

    /// Skip to the next playlist entry.
    pub async fn next(&self) -> Result<(), ClientError> {
        info!("playlist next");
        let resp = self.http.post(self.url(PLAYLIST_NEXT_PATH)).send().await?;
        expect_action_ok(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.http.get(self.url(path)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, resp).await);
        }
        let body = resp.text().await?;
        debug!("GET {} -> {} ({} bytes)", path, status, body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

impl PlaylistSource for PlaylistClient {
    fn fetch_playlist(&self) -> impl Future<Output = Result<Vec<PlaylistEntry>, ClientError>> + Send {
        self.playlist()
    }

    fn fetch_current(&self) -> impl Future<Output = Result<CurrentFileInfo, ClientError>> + Send {
        self.current()
    }
}

/// Form posts succeed with a 2xx or with the server's 303 back to `/`.
async fn expect_action_ok(resp: Response) -> Result<(), ClientError> {
    let status = resp.status();
    if status.is_success() || status == StatusCode::SEE_OTHER {
        return Ok(());
    }
    Err(status_error(status, resp).await)
}

async fn status_error(status: StatusCode, resp: Response) -> ClientError {
    let body = resp.text().await.unwrap_or_default();
    ClientError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    }
}

/// Prefer the server's `{status, message}` JSON, then the raw body, then the
/// canonical reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(api) = serde_json::from_str::<ApiErrorBody>(body) {
        return api.message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status.canonical_reason().unwrap_or("error").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let client = PlaylistClient::new(" http://10.0.0.2:8080/ ", None).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.2:8080");
        assert_eq!(client.url(PLAYLIST_PATH), "http://10.0.0.2:8080/api/playlist");
    }

    #[test]
    fn base_url_needs_a_scheme() {
        let err = PlaylistClient::new("10.0.0.2:8080", None).unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
    }

    #[test]
    fn error_message_prefers_api_json() {
        let body = r#"{"status":400,"message":"attempted to enqueue empty url"}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "attempted to enqueue empty url"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "  mpv died \n"),
            "mpv died"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }
}
