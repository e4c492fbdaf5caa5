//! Feishu HTTP client

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::feishu;
use crate::directory::paging::{fetch_all, PaginatedResponse, PagingOptions};
use crate::directory::token::{IssuedToken, TokenCache, TokenManager};
use crate::directory::transport::{ApiStatus, Transport};
use crate::error::{OrgError, Result};
use crate::session::AppCredentials;

use super::models::{Envelope, TenantTokenResponse};

/// Feishu open API client
pub struct FeishuClient {
    transport: Transport,
    credentials: AppCredentials,
    tokens: TokenManager,
    paging: PagingOptions,
    /// Custom base URL override (for testing with mock servers)
    base_url_override: Option<String>,
}

impl FeishuClient {
    pub fn new(transport: Transport, credentials: AppCredentials, cache: Arc<TokenCache>) -> Self {
        Self {
            transport,
            credentials,
            tokens: TokenManager::new(cache, feishu::TOKEN_CACHE_KEY),
            paging: PagingOptions::default(),
            base_url_override: None,
        }
    }

    /// Point the client at a different server (mock servers, private deployments)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn with_paging(mut self, paging: PagingOptions) -> Self {
        self.paging = paging;
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or(feishu::BASE_URL)
    }

    /// Return a valid tenant access token, issuing one on cache miss.
    pub async fn tenant_access_token(&self) -> Result<String> {
        self.tokens.ensure_with(|| self.issue_token()).await
    }

    async fn issue_token(&self) -> Result<IssuedToken> {
        if self.credentials.app_id.is_empty() || self.credentials.app_secret.is_empty() {
            return Err(OrgError::Auth(
                "Feishu app_id/app_secret not configured (run 'orgctl config set feishu')"
                    .to_string(),
            ));
        }

        let url = format!("{}{}", self.base_url(), feishu::TENANT_TOKEN);
        debug!("Requesting tenant access token from: {}", url);

        let request = self.transport.client().post(&url).json(&serde_json::json!({
            "app_id": self.credentials.app_id,
            "app_secret": self.credentials.app_secret,
        }));

        let response: TenantTokenResponse = self
            .transport
            .send_json(request, "tenant access token")
            .await
            .map_err(|e| match e {
                OrgError::Api { message, .. } => OrgError::Auth(message),
                other => other,
            })?;

        if response.code() != 0 {
            return Err(OrgError::Auth(format!("from server - {}", response.message())));
        }

        debug!("Issued tenant access token valid for {}s", response.expire);
        Ok(IssuedToken {
            value: response.tenant_access_token,
            expires_in: response.expire,
        })
    }

    /// GET `path` (with query) and unwrap the `data` payload
    pub(crate) async fn get_data<T>(&self, path: &str, context: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let token = self.tenant_access_token().await?;
        let url = format!("{}{}", self.base_url(), path);
        debug!("Fetching {} from: {}", context, url);

        let request = self
            .transport
            .client()
            .get(&url)
            .header("Authorization", format!("Bearer {}", token));
        let envelope: Envelope<T> = self.transport.send_json(request, context).await?;
        envelope.into_data(context)
    }

    /// POST a JSON body to `path` and check the envelope
    pub(crate) async fn post_json<B>(&self, path: &str, body: &B, context: &str) -> Result<()>
    where
        B: Serialize,
    {
        let token = self.tenant_access_token().await?;
        let url = format!("{}{}", self.base_url(), path);
        debug!("Posting {} to: {}", context, url);

        let request = self
            .transport
            .client()
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(body);
        let envelope: Envelope<serde_json::Value> =
            self.transport.send_json(request, context).await?;
        envelope.check()
    }

    /// Follow `page_token` across every page of a listing.
    ///
    /// `path` must already carry a query string.
    pub(crate) async fn fetch_all_pages<P>(&self, path: &str, context: &str) -> Result<Vec<P::Item>>
    where
        P: PaginatedResponse + DeserializeOwned,
    {
        fetch_all(self.paging, context, |cursor| {
            let page_path = match cursor {
                Some(token) => format!("{}&page_token={}", path, urlencoding::encode(&token)),
                None => path.to_string(),
            };
            async move { self.get_data::<P>(&page_path, context).await }
        })
        .await
    }
}

#[cfg(test)]
impl FeishuClient {
    /// Client with fixed credentials against a mock server
    pub fn test_client(base_url: &str, cache: Arc<TokenCache>) -> Self {
        let transport = Transport::new(None, Default::default()).unwrap();
        let credentials = AppCredentials {
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
        };
        Self::new(transport, credentials, cache)
            .with_base_url(base_url)
            .with_paging(PagingOptions {
                interval: std::time::Duration::from_millis(1),
                max_pages: 20,
            })
    }
}
