//! Feishu command definitions and arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::common::{IdTypeArgs, OutputFormat};

/// Feishu (Lark) contact API commands
#[derive(Subcommand, Debug)]
pub enum FeishuCommand {
    /// Issue a tenant token and show the app's auth scope
    Token(TokenArgs),

    /// Department commands
    #[command(name = "dp", visible_alias = "department")]
    Dp {
        #[command(subcommand)]
        command: DpCommand,
    },

    /// User commands
    #[command(visible_alias = "users")]
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Reset a user's enterprise mailbox password
    #[command(name = "email-password")]
    EmailPassword(EmailPasswordArgs),

    /// Walk departments recursively and write HTML/CSV reports
    Dump(DumpArgs),
}

/// Arguments for 'feishu token'
#[derive(Parser, Debug)]
pub struct TokenArgs {
    #[command(flatten)]
    pub ids: IdTypeArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum DpCommand {
    /// Show one department
    Get(DpGetArgs),

    /// List child departments
    #[command(visible_alias = "list")]
    Ls(DpLsArgs),
}

#[derive(Parser, Debug)]
pub struct DpGetArgs {
    /// Department id ("0" is the tenant root)
    pub id: String,

    #[command(flatten)]
    pub ids: IdTypeArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct DpLsArgs {
    /// Parent department id ("0" is the tenant root)
    pub id: String,

    /// Include all descendants, not only direct children
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub ids: IdTypeArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Show one user
    Get(UserGetArgs),

    /// List users directly in a department
    #[command(visible_alias = "list")]
    Ls(UserLsArgs),
}

#[derive(Parser, Debug)]
pub struct UserGetArgs {
    /// User id
    pub id: String,

    #[command(flatten)]
    pub ids: IdTypeArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct UserLsArgs {
    /// Department id
    pub department_id: String,

    #[command(flatten)]
    pub ids: IdTypeArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct EmailPasswordArgs {
    /// User id
    pub user_id: String,

    /// New password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,

    #[command(flatten)]
    pub ids: IdTypeArgs,
}

#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
        orgctl feishu dump                 # every department in the auth scope\n  \
        orgctl feishu dump od-1234 --dt openid --out-dir reports\n  \
        orgctl --keep-going feishu dump 0")]
pub struct DumpArgs {
    /// Root department id (defaults to the departments in the auth scope)
    pub id: Option<String>,

    #[command(flatten)]
    pub ids: IdTypeArgs,

    /// Directory for the HTML and CSV reports
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}
