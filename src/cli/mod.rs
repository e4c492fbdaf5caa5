//! CLI argument parsing

mod common;
mod config;
mod feishu;
mod wechat;

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{defaults, fetch};
use crate::directory::retry::RetryPolicy;
use crate::session::{CredentialFlags, Settings};

pub use common::{IdType, IdTypeArgs, OutputFormat};
pub use config::{ConfigAction, SetTarget, UnsetTarget, ViewArgs};
pub use feishu::{
    DpCommand as FeishuDpCommand, DpGetArgs as FeishuDpGetArgs, DpLsArgs as FeishuDpLsArgs,
    DumpArgs as FeishuDumpArgs, EmailPasswordArgs, FeishuCommand, TokenArgs as FeishuTokenArgs,
    UserCommand as FeishuUserCommand, UserGetArgs as FeishuUserGetArgs,
    UserLsArgs as FeishuUserLsArgs,
};
pub use wechat::{
    DpCommand as WechatDpCommand, DpGetArgs as WechatDpGetArgs, DpTreeArgs as WechatDpTreeArgs,
    DumpArgs as WechatDumpArgs, UserCommand as WechatUserCommand,
    UserGetArgs as WechatUserGetArgs, UserLsArgs as WechatUserLsArgs, WechatCommand,
};

/// Feishu and WeChat Work directory explorer
#[derive(Parser, Debug)]
#[command(name = "orgctl")]
#[command(version)]
#[command(about = "Explore Feishu and WeChat Work organization directories", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
        orgctl config set feishu --app-id cli_a1b2\n  \
        orgctl feishu token\n  \
        orgctl feishu dp ls 0 --recursive -o json\n  \
        orgctl feishu dump --out-dir reports\n  \
        orgctl wx dp tree\n  \
        orgctl wx dump 1")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Batch mode: no spinners, no interactive prompts
    #[arg(short = 'b', long, global = true)]
    pub batch: bool,

    /// Omit header row in table and CSV output
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Proxy URL (http, https or socks5); overrides ORGCTL_PROXY and the session file
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Attempts per directory call before giving up
    #[arg(long, global = true, default_value_t = fetch::RETRY_ATTEMPTS)]
    pub retries: u32,

    /// Pause between directory calls and retries, in milliseconds
    #[arg(long, global = true, default_value_t = fetch::INTERVAL_MS)]
    pub interval_ms: u64,

    /// Stop paginating after this many pages
    #[arg(long, global = true, default_value_t = fetch::MAX_PAGES)]
    pub max_pages: usize,

    /// Skip departments whose fetches fail instead of stopping the walk
    #[arg(long, global = true)]
    pub keep_going: bool,

    /// Feishu app id (overrides FEISHU_APP_ID and the session file)
    #[arg(long, global = true)]
    pub app_id: Option<String>,

    /// Feishu app secret (overrides FEISHU_APP_SECRET and the session file)
    #[arg(long, global = true)]
    pub app_secret: Option<String>,

    /// WeChat Work corp id (overrides WECHAT_CORP_ID and the session file)
    #[arg(long, global = true)]
    pub corp_id: Option<String>,

    /// WeChat Work corp secret (overrides WECHAT_CORP_SECRET and the session file)
    #[arg(long, global = true)]
    pub corp_secret: Option<String>,
}

impl Cli {
    /// Credential and proxy values given on the command line
    pub fn credential_flags(&self) -> CredentialFlags {
        CredentialFlags {
            app_id: self.app_id.clone(),
            app_secret: self.app_secret.clone(),
            corp_id: self.corp_id.clone(),
            corp_secret: self.corp_secret.clone(),
            proxy: self.proxy.clone(),
        }
    }

    /// Fetch tunables and output switches
    pub fn settings(&self) -> Settings {
        let interval = Duration::from_millis(self.interval_ms);
        Settings {
            retry: RetryPolicy::new(self.retries, interval),
            interval,
            max_pages: self.max_pages.max(1),
            abort_on_subtree_failure: !self.keep_going,
            batch: self.batch,
            no_header: self.no_header,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage stored credentials and proxy
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Feishu (Lark) contact directory
    #[command(visible_alias = "fs")]
    Feishu {
        #[command(subcommand)]
        command: FeishuCommand,
    },

    /// WeChat Work contact directory
    #[command(visible_alias = "wx")]
    Wechat {
        #[command(subcommand)]
        command: WechatCommand,
    },
}
