//! Config management CLI arguments

use clap::{Parser, Subcommand};

/// Config subcommands for managing stored credentials
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Store credentials or the proxy in the session file
    Set {
        #[command(subcommand)]
        target: SetTarget,
    },

    /// Remove a stored setting
    Unset {
        #[command(subcommand)]
        target: UnsetTarget,
    },

    /// Display stored settings (secrets masked)
    View(ViewArgs),
}

/// What 'config set' updates
#[derive(Subcommand, Debug)]
#[command(after_help = "EXAMPLES:\n  \
        orgctl --app-id cli_a1b2 config set feishu      # secret is prompted\n  \
        orgctl --corp-id ww12 --corp-secret S config set wechat\n  \
        orgctl config set proxy socks5://127.0.0.1:1080")]
pub enum SetTarget {
    /// Feishu app credentials (from --app-id/--app-secret or prompts)
    Feishu,

    /// WeChat Work corp credentials (from --corp-id/--corp-secret or prompts)
    #[command(visible_alias = "wx")]
    Wechat,

    /// HTTP(S) or SOCKS5 proxy for every request
    Proxy {
        /// Proxy URL, e.g. http://127.0.0.1:8080
        url: String,
    },
}

/// What 'config unset' removes
#[derive(Subcommand, Debug)]
pub enum UnsetTarget {
    /// Stop using a proxy
    Proxy,
}

/// Arguments for 'config view'
#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// Print the session file as JSON, secrets included
    #[arg(long)]
    pub raw: bool,
}
