//! Credential resolution from multiple sources

use log::debug;

use crate::config::{feishu, session as session_config, wechat};
use crate::error::{OrgError, Result};

use super::models::{AppCredentials, CorpCredentials, SessionConfig};

/// Values given on the command line; each one overrides env and file
#[derive(Debug, Clone, Default)]
pub struct CredentialFlags {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub corp_id: Option<String>,
    pub corp_secret: Option<String>,
    pub proxy: Option<String>,
}

/// Looks up an environment variable; swapped out in tests
pub type EnvLookup = dyn Fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Pick a value from, in order:
/// 1. CLI flag
/// 2. environment variable `env_var`
/// 3. session file
fn resolve_field(
    field: &str,
    flag: Option<&str>,
    env_var: &str,
    env: &EnvLookup,
    file: Option<&str>,
) -> Option<String> {
    if let Some(value) = flag.filter(|v| !v.is_empty()) {
        debug!("Using {} from CLI flag", field);
        return Some(value.to_string());
    }

    if let Some(value) = env(env_var).filter(|v| !v.is_empty()) {
        debug!("Using {} from {} environment variable", field, env_var);
        return Some(value);
    }

    if let Some(value) = file.filter(|v| !v.is_empty()) {
        debug!("Using {} from session file", field);
        return Some(value.to_string());
    }

    debug!("No {} found in flags, {} or session file", field, env_var);
    None
}

fn missing(backend: &str, fields: &[&str], flags: &[&str], envs: &[&str]) -> OrgError {
    OrgError::Auth(format!(
        "{} credentials are not configured (missing {}). Provide them using one of:\n\
         \n\
         1. CLI flags:        {}\n\
         2. Environment vars: {}\n\
         3. Session file:     orgctl config set {}",
        backend,
        fields.join(", "),
        flags.join(" "),
        envs.join(", "),
        backend.to_lowercase()
    ))
}

/// Resolve the Feishu app id and secret
pub fn resolve_feishu(flags: &CredentialFlags, config: &SessionConfig) -> Result<AppCredentials> {
    resolve_feishu_with(flags, config, &process_env)
}

pub(crate) fn resolve_feishu_with(
    flags: &CredentialFlags,
    config: &SessionConfig,
    env: &EnvLookup,
) -> Result<AppCredentials> {
    let file = config.feishu.as_ref();
    let app_id = resolve_field(
        "Feishu app_id",
        flags.app_id.as_deref(),
        feishu::APP_ID_ENV,
        env,
        file.map(|c| c.app_id.as_str()),
    );
    let app_secret = resolve_field(
        "Feishu app_secret",
        flags.app_secret.as_deref(),
        feishu::APP_SECRET_ENV,
        env,
        file.map(|c| c.app_secret.as_str()),
    );

    match (app_id, app_secret) {
        (Some(app_id), Some(app_secret)) => Ok(AppCredentials { app_id, app_secret }),
        (app_id, _) => {
            let fields: Vec<&str> = if app_id.is_none() {
                vec!["app_id", "app_secret"]
            } else {
                vec!["app_secret"]
            };
            Err(missing(
                "Feishu",
                &fields,
                &["--app-id <ID>", "--app-secret <SECRET>"],
                &[feishu::APP_ID_ENV, feishu::APP_SECRET_ENV],
            ))
        }
    }
}

/// Resolve the WeChat Work corp id and secret
pub fn resolve_wechat(flags: &CredentialFlags, config: &SessionConfig) -> Result<CorpCredentials> {
    resolve_wechat_with(flags, config, &process_env)
}

pub(crate) fn resolve_wechat_with(
    flags: &CredentialFlags,
    config: &SessionConfig,
    env: &EnvLookup,
) -> Result<CorpCredentials> {
    let file = config.wechat.as_ref();
    let corp_id = resolve_field(
        "WeChat corp_id",
        flags.corp_id.as_deref(),
        wechat::CORP_ID_ENV,
        env,
        file.map(|c| c.corp_id.as_str()),
    );
    let corp_secret = resolve_field(
        "WeChat corp_secret",
        flags.corp_secret.as_deref(),
        wechat::CORP_SECRET_ENV,
        env,
        file.map(|c| c.corp_secret.as_str()),
    );

    match (corp_id, corp_secret) {
        (Some(corp_id), Some(corp_secret)) => Ok(CorpCredentials {
            corp_id,
            corp_secret,
        }),
        (corp_id, _) => {
            let fields: Vec<&str> = if corp_id.is_none() {
                vec!["corp_id", "corp_secret"]
            } else {
                vec!["corp_secret"]
            };
            Err(missing(
                "WeChat",
                &fields,
                &["--corp-id <ID>", "--corp-secret <SECRET>"],
                &[wechat::CORP_ID_ENV, wechat::CORP_SECRET_ENV],
            ))
        }
    }
}

/// Resolve the upstream proxy URL, if any
pub fn resolve_proxy(flags: &CredentialFlags, config: &SessionConfig) -> Option<String> {
    resolve_proxy_with(flags, config, &process_env)
}

pub(crate) fn resolve_proxy_with(
    flags: &CredentialFlags,
    config: &SessionConfig,
    env: &EnvLookup,
) -> Option<String> {
    resolve_field(
        "proxy",
        flags.proxy.as_deref(),
        session_config::PROXY_ENV,
        env,
        config.proxy.as_deref(),
    )
}
