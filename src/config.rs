/// Feishu (Lark) open platform endpoints
pub mod feishu {
    /// Base URL for the open API
    pub const BASE_URL: &str = "https://open.feishu.cn/open-apis";

    /// Tenant access token issuance for self-built apps
    pub const TENANT_TOKEN: &str = "/auth/v3/tenant_access_token/internal";

    /// Departments/users/groups visible to the app
    pub const SCOPES: &str = "/contact/v3/scopes";

    /// Department detail and children (`/{id}`, `/{id}/children`)
    pub const DEPARTMENTS: &str = "/contact/v3/departments";

    /// User detail (`/{id}`)
    pub const USERS: &str = "/contact/v3/users";

    /// Users directly assigned to a department
    pub const USERS_BY_DEPARTMENT: &str = "/contact/v3/users/find_by_department";

    /// Enterprise mailbox password reset
    pub const PASSWORD_RESET: &str = "/admin/v1/password/reset";

    /// Page size for child department and user listings
    pub const PAGE_SIZE: u32 = 50;

    /// Page size for auth scope listing
    pub const SCOPE_PAGE_SIZE: u32 = 100;

    /// Delay between consecutive page requests
    pub const PAGE_INTERVAL_MS: u64 = 200;

    /// Parent id carried by top-level departments
    pub const ROOT_PARENT_ID: &str = "0";

    /// Token cache key for the tenant access token
    pub const TOKEN_CACHE_KEY: &str = "feishu.tenant_access_token";

    /// Environment variables for credentials
    pub const APP_ID_ENV: &str = "FEISHU_APP_ID";
    pub const APP_SECRET_ENV: &str = "FEISHU_APP_SECRET";
}

/// WeChat Work (WeCom) endpoints
pub mod wechat {
    /// Base URL for the server API
    pub const BASE_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin";

    /// Access token issuance
    pub const TOKEN: &str = "/gettoken";

    pub const DEPARTMENT_GET: &str = "/department/get";
    pub const DEPARTMENT_LIST: &str = "/department/list";
    pub const DEPARTMENT_SIMPLE_LIST: &str = "/department/simplelist";
    pub const USER_GET: &str = "/user/get";
    pub const USER_LIST: &str = "/user/list";

    /// Token cache key for the access token
    pub const TOKEN_CACHE_KEY: &str = "wechat.access_token";

    /// Environment variables for credentials
    pub const CORP_ID_ENV: &str = "WECHAT_CORP_ID";
    pub const CORP_SECRET_ENV: &str = "WECHAT_CORP_SECRET";
}

/// Fetch behaviour shared by both backends
pub mod fetch {
    /// Attempts per call before giving up
    pub const RETRY_ATTEMPTS: u32 = 3;

    /// Delay between walk calls and between retry attempts
    pub const INTERVAL_MS: u64 = 100;

    /// Upper bound on pages followed for one listing
    pub const MAX_PAGES: usize = 1000;

    /// Token cache sweep period
    pub const CACHE_SWEEP_SECS: u64 = 3;

    /// Longest token lifetime accepted from a token endpoint, in seconds
    pub const MAX_TOKEN_TTL_SECS: i64 = 86_400;

    /// Request timeout
    pub const TIMEOUT_SECS: u64 = 20;

    /// Connect timeout
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Persisted session file
pub mod session {
    /// Directory under the home directory
    pub const DIR_NAME: &str = ".orgctl";

    /// Config file name
    pub const FILE_NAME: &str = "config.json";

    /// Environment variable for the upstream proxy
    pub const PROXY_ENV: &str = "ORGCTL_PROXY";
}

/// Report file names (without extension)
pub mod reports {
    pub const FEISHU_DUMP: &str = "feishu_dump";
    pub const WECHAT_DUMP: &str = "wechat_dump";
    pub const WECHAT_DEPARTMENT_IDS: &str = "wechat_dept_ids";
    pub const WECHAT_DEPARTMENTS: &str = "wechat_dept";
    pub const WECHAT_USERS: &str = "wechat_users";
}

/// Default values for CLI
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "warn";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_rooted() {
        for p in [
            feishu::TENANT_TOKEN,
            feishu::SCOPES,
            feishu::DEPARTMENTS,
            feishu::USERS_BY_DEPARTMENT,
            wechat::TOKEN,
            wechat::DEPARTMENT_LIST,
            wechat::USER_LIST,
        ] {
            assert!(p.starts_with('/'), "{} should start with '/'", p);
        }
    }

    #[test]
    fn test_base_urls_have_no_trailing_slash() {
        assert!(!feishu::BASE_URL.ends_with('/'));
        assert!(!wechat::BASE_URL.ends_with('/'));
    }

    #[test]
    fn test_fetch_defaults() {
        assert_eq!(fetch::RETRY_ATTEMPTS, 3);
        assert!(fetch::MAX_PAGES >= 100);
    }
}
