//! Persisted session data models

use serde::{Deserialize, Serialize};

/// Feishu self-built app credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

/// WeChat Work corp credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpCredentials {
    pub corp_id: String,
    pub corp_secret: String,
}

/// Top-level session configuration. Tokens are never stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upstream proxy URL (http, https or socks5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feishu: Option<AppCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wechat: Option<CorpCredentials>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert!(config.proxy.is_none());
        assert!(config.feishu.is_none());
        assert!(config.wechat.is_none());
    }

    #[test]
    fn test_empty_sections_not_serialized() {
        let config = SessionConfig {
            proxy: Some("socks5://127.0.0.1:1080".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("socks5://127.0.0.1:1080"));
        assert!(!json.contains("feishu"));
        assert!(!json.contains("wechat"));
    }

    #[test]
    fn test_parse_full_config() {
        let config: SessionConfig = serde_json::from_value(serde_json::json!({
            "feishu": {"app_id": "cli_a1b2", "app_secret": "s3cr3t"},
            "wechat": {"corp_id": "ww123", "corp_secret": "c0rp"}
        }))
        .unwrap();
        assert_eq!(config.feishu.unwrap().app_id, "cli_a1b2");
        assert_eq!(config.wechat.unwrap().corp_secret, "c0rp");
    }
}
