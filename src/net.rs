use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::config::{CONNECT_TIMEOUT, READ_TIMEOUT, USER_AGENT};
use crate::error::FetchError;

/// GET capability used by the fetcher and the downloader.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.send(url)
            .await?
            .text()
            .await
            .map_err(|e| transport_error(url, e))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let body = self
            .send(url)
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;
        Ok(body.to_vec())
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    enum Canned {
        Body(Vec<u8>),
        Status(u16),
    }

    /// In-memory transport: canned bodies or statuses per URL, optional per-URL delay,
    /// and a log of every URL requested.
    #[derive(Default)]
    pub struct FakeTransport {
        routes: HashMap<String, Canned>,
        delays: HashMap<String, Duration>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
            self.routes.insert(url.into(), Canned::Body(body.into()));
            self
        }

        pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
            self.routes.insert(url.into(), Canned::Status(status));
            self
        }

        pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
            self.delays.insert(url.into(), delay);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get_text(&self, url: &str) -> Result<String, FetchError> {
            let bytes = self.get_bytes(url).await?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }
            match self.routes.get(url) {
                Some(Canned::Body(body)) => Ok(body.clone()),
                Some(Canned::Status(status)) => Err(FetchError::HttpStatus {
                    status: *status,
                    url: url.to_string(),
                }),
                None => Err(FetchError::Transport {
                    url: url.to_string(),
                    message: "connection refused".into(),
                }),
            }
        }
    }
}
