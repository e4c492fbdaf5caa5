//! WeChat Work HTTP client

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;

use crate::config::wechat;
use crate::directory::token::{IssuedToken, TokenCache, TokenManager};
use crate::directory::transport::{query_string, ApiStatus, Transport};
use crate::error::{OrgError, Result};
use crate::session::CorpCredentials;

use super::models::{Reply, TokenBody};

/// WeChat Work server API client
pub struct WechatClient {
    transport: Transport,
    credentials: CorpCredentials,
    tokens: TokenManager,
    /// Custom base URL override (for testing with mock servers)
    base_url_override: Option<String>,
}

impl WechatClient {
    pub fn new(transport: Transport, credentials: CorpCredentials, cache: Arc<TokenCache>) -> Self {
        Self {
            transport,
            credentials,
            tokens: TokenManager::new(cache, wechat::TOKEN_CACHE_KEY),
            base_url_override: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or(wechat::BASE_URL)
    }

    /// Return a valid access token, issuing one on cache miss.
    pub async fn access_token(&self) -> Result<String> {
        self.tokens.ensure_with(|| self.issue_token()).await
    }

    async fn issue_token(&self) -> Result<IssuedToken> {
        if self.credentials.corp_id.is_empty() || self.credentials.corp_secret.is_empty() {
            return Err(OrgError::Auth(
                "WeChat corp_id/corp_secret not configured (run 'orgctl config set wechat')"
                    .to_string(),
            ));
        }

        let base = format!("{}{}", self.base_url(), wechat::TOKEN);
        debug!("Requesting access token from: {}", base);

        let url = format!(
            "{}?{}",
            base,
            query_string(&[
                ("corpid", self.credentials.corp_id.as_str()),
                ("corpsecret", self.credentials.corp_secret.as_str()),
            ])
        );
        let reply: Reply<TokenBody> = self
            .transport
            .send_json(self.transport.client().get(&url), "access token")
            .await
            .map_err(|e| match e {
                OrgError::Api { message, .. } => OrgError::Auth(message),
                other => other,
            })?;

        if reply.code() != 0 {
            return Err(OrgError::Auth(format!("from server - {}", reply.message())));
        }

        debug!("Issued access token valid for {}s", reply.body.expires_in);
        Ok(IssuedToken {
            value: reply.body.access_token,
            expires_in: reply.body.expires_in,
        })
    }

    /// GET `path` with `params` plus the access token and check `errcode`.
    pub(crate) async fn get<T>(&self, path: &str, params: &[(&str, &str)], context: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let token = self.access_token().await?;
        let base = format!("{}{}", self.base_url(), path);
        debug!("Fetching {} from: {} ({})", context, base, query_string(params));

        let mut pairs = vec![("access_token", token.as_str())];
        pairs.extend_from_slice(params);
        let url = format!("{}?{}", base, query_string(&pairs));

        let reply: Reply<T> = self
            .transport
            .send_json(self.transport.client().get(&url), context)
            .await?;
        reply.check()?;
        Ok(reply.body)
    }
}

#[cfg(test)]
impl WechatClient {
    pub fn test_client(base_url: &str, cache: Arc<TokenCache>) -> Self {
        let transport = Transport::new(None, Default::default()).unwrap();
        let credentials = CorpCredentials {
            corp_id: "ww_test".to_string(),
            corp_secret: "corp-secret".to_string(),
        };
        Self::new(transport, credentials, cache).with_base_url(base_url)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const TEST_TOKEN: &str = "accesstoken000001";

    pub async fn mount_token(server: &MockServer, times: u64) {
        Mock::given(method("GET"))
            .and(path("/gettoken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 0,
                "errmsg": "ok",
                "access_token": TEST_TOKEN,
                "expires_in": 7200
            })))
            .expect(times)
            .mount(server)
            .await;
    }
}
