//! Shared HTTP plumbing for both directory backends

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::watch;

use crate::config::fetch;
use crate::error::{OrgError, Result};

/// Process-wide interrupt flag.
///
/// Once cancelled it stays cancelled; every in-flight and later request
/// fails with [`OrgError::Cancelled`].
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as self, so this only returns on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Success/failure fields every backend envelope carries
pub trait ApiStatus {
    fn code(&self) -> i64;
    fn message(&self) -> &str;

    /// Turn a non-zero code into [`OrgError::Api`].
    fn check(&self) -> Result<()> {
        if self.code() == 0 {
            Ok(())
        } else {
            Err(OrgError::Api {
                code: self.code(),
                message: self.message().to_string(),
            })
        }
    }
}

/// URL-encode `pairs` as `k=v&k=v` (no leading `?`)
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Error fields of either backend's envelope, used to explain non-2xx replies
#[derive(Deserialize, Debug, Default)]
struct ErrorEnvelope {
    #[serde(default, alias = "errcode")]
    code: Option<i64>,
    #[serde(default, alias = "errmsg")]
    msg: Option<String>,
}

/// Configured reqwest client plus the cancellation flag
#[derive(Clone)]
pub struct Transport {
    client: Client,
    cancel: CancelToken,
}

impl Transport {
    /// Build a client with timeouts and an optional upstream proxy
    /// (`http://`, `https://` or `socks5://`).
    pub fn new(proxy: Option<&str>, cancel: CancelToken) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(fetch::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(fetch::TIMEOUT_SECS));

        if let Some(url) = proxy.map(str::trim).filter(|u| !u.is_empty()) {
            debug!("Using proxy {}", url);
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| OrgError::Config(format!("Invalid proxy '{}': {}", url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| OrgError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, cancel })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a request and decode its JSON body.
    ///
    /// Non-2xx replies become [`OrgError::Api`], using the backend's own
    /// code and message when the body carries them.
    pub async fn send_json<T>(&self, request: RequestBuilder, context: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if self.cancel.is_cancelled() {
            return Err(OrgError::Cancelled);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<(StatusCode, String), OrgError>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(OrgError::Cancelled),
            result = exchange => result?,
        };

        debug!("{} responded with status {}", context, status);

        if !status.is_success() {
            let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
            return Err(OrgError::Api {
                code: envelope.code.unwrap_or(i64::from(status.as_u16())),
                message: envelope
                    .msg
                    .unwrap_or_else(|| format!("Failed to fetch {} (HTTP {})", context, status)),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| OrgError::Json(format!("Failed to parse {}: {}", context, e)))
    }
}
