//! orgctl - Explore Feishu and WeChat Work organization directories
//!
//! A debugging CLI for the contact (directory) APIs of Feishu/Lark and
//! WeChat Work: issue tokens, inspect departments and users, and dump a
//! whole org chart as a console tree plus HTML and CSV reports.
//!
//! # Features
//!
//! - Token issuance with an in-process expiring cache
//! - Automatic pagination with a page limit
//! - Recursive department walk with retries and a partial-result policy
//! - Multiple output formats (table, CSV, JSON, YAML)
//! - Credentials from flags, environment or `~/.orgctl/config.json`
//!
//! # Example
//!
//! ```bash
//! # Store Feishu credentials (secret is prompted)
//! orgctl --app-id cli_a1b2 config set feishu
//!
//! # Show the tenant token and the app's auth scope
//! orgctl feishu token
//!
//! # List all sub-departments of the tenant root as JSON
//! orgctl feishu dp ls 0 --recursive -o json
//!
//! # Dump every department in the auth scope to reports/
//! orgctl feishu dump --out-dir reports
//!
//! # WeChat Work department tree
//! orgctl wx dp tree
//! ```

pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod output;
pub mod session;
pub mod ui;

pub use cli::{Cli, Command, ConfigAction, FeishuCommand, OutputFormat, WechatCommand};
pub use directory::feishu::{run_feishu_command, FeishuClient};
pub use directory::transport::CancelToken;
pub use directory::wechat::{run_wechat_command, WechatClient};
pub use directory::{build_tree, Identifier, Walker};
pub use error::{OrgError, Result};
pub use session::{run_config_command, Session, SessionStore, Settings};
