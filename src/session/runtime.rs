//! Per-process session state
//!
//! One [`Session`] is built in `main` and handed to every command handler.
//! It owns the loaded session file, the shared token cache (and its sweeper
//! task), the interrupt flag and the fetch tunables from the command line.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;

use crate::config::{feishu as feishu_config, fetch, wechat as wechat_config};
use crate::directory::feishu::FeishuClient;
use crate::directory::paging::PagingOptions;
use crate::directory::retry::RetryPolicy;
use crate::directory::token::{spawn_sweeper, TokenCache};
use crate::directory::transport::{CancelToken, Transport};
use crate::directory::walker::WalkOptions;
use crate::directory::wechat::WechatClient;
use crate::error::Result;

use super::models::{AppCredentials, CorpCredentials, SessionConfig};
use super::resolve::{resolve_feishu, resolve_proxy, resolve_wechat, CredentialFlags};
use super::store::SessionStore;

/// Fetch tunables and output switches taken from global flags
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub retry: RetryPolicy,
    /// Pause between walk calls
    pub interval: Duration,
    pub max_pages: usize,
    pub abort_on_subtree_failure: bool,
    /// No spinners, no prompts
    pub batch: bool,
    pub no_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            interval: Duration::from_millis(fetch::INTERVAL_MS),
            max_pages: fetch::MAX_PAGES,
            abort_on_subtree_failure: true,
            batch: false,
            no_header: false,
        }
    }
}

impl Settings {
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            retry: self.retry,
            interval: self.interval,
            abort_on_subtree_failure: self.abort_on_subtree_failure,
        }
    }

    pub fn paging(&self) -> PagingOptions {
        PagingOptions {
            max_pages: self.max_pages,
            ..PagingOptions::default()
        }
    }
}

/// Explicit session passed to every command handler
pub struct Session {
    store: SessionStore,
    config: SessionConfig,
    flags: CredentialFlags,
    settings: Settings,
    cancel: CancelToken,
    cache: Arc<TokenCache>,
    sweeper: Option<JoinHandle<()>>,
}

impl Session {
    /// Load the session file and start the token cache sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        store: SessionStore,
        flags: CredentialFlags,
        settings: Settings,
        cancel: CancelToken,
    ) -> Result<Self> {
        let config = store.load()?;
        let cache = Arc::new(TokenCache::new());
        let sweeper = spawn_sweeper(&cache, Duration::from_secs(fetch::CACHE_SWEEP_SECS));
        debug!("Session opened from {}", store.path().display());

        Ok(Self {
            store,
            config,
            flags,
            settings,
            cancel,
            cache,
            sweeper: Some(sweeper),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Credential and proxy values given on the command line
    pub fn flags(&self) -> &CredentialFlags {
        &self.flags
    }

    fn transport(&self) -> Result<Transport> {
        let proxy = resolve_proxy(&self.flags, &self.config);
        Transport::new(proxy.as_deref(), self.cancel.clone())
    }

    /// Feishu client for the resolved credentials.
    ///
    /// Fails with an auth error before any request when credentials are missing.
    pub fn feishu_client(&self) -> Result<FeishuClient> {
        let credentials = resolve_feishu(&self.flags, &self.config)?;
        Ok(
            FeishuClient::new(self.transport()?, credentials, Arc::clone(&self.cache))
                .with_paging(self.settings.paging()),
        )
    }

    /// WeChat Work client for the resolved credentials.
    pub fn wechat_client(&self) -> Result<WechatClient> {
        let credentials = resolve_wechat(&self.flags, &self.config)?;
        Ok(WechatClient::new(
            self.transport()?,
            credentials,
            Arc::clone(&self.cache),
        ))
    }

    /// Replace the stored Feishu credentials and drop any token issued for the old ones.
    pub fn set_feishu(&mut self, credentials: AppCredentials) -> Result<()> {
        self.config.feishu = Some(credentials);
        self.store.save(&self.config)?;
        self.cache.remove(feishu_config::TOKEN_CACHE_KEY);
        info!("Feishu credentials updated");
        Ok(())
    }

    /// Replace the stored WeChat credentials and drop any token issued for the old ones.
    pub fn set_wechat(&mut self, credentials: CorpCredentials) -> Result<()> {
        self.config.wechat = Some(credentials);
        self.store.save(&self.config)?;
        self.cache.remove(wechat_config::TOKEN_CACHE_KEY);
        info!("WeChat credentials updated");
        Ok(())
    }

    pub fn set_proxy(&mut self, proxy: Option<String>) -> Result<()> {
        self.config.proxy = proxy;
        self.store.save(&self.config)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
