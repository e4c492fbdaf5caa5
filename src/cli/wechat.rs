//! WeChat Work command definitions and arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::common::OutputFormat;

/// WeChat Work contact API commands
#[derive(Subcommand, Debug)]
pub enum WechatCommand {
    /// Issue an access token and print it
    Token,

    /// Department commands
    #[command(name = "dp", visible_alias = "department")]
    Dp {
        #[command(subcommand)]
        command: DpCommand,
    },

    /// Member commands
    #[command(visible_alias = "users")]
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Fetch departments and members and write HTML/CSV reports
    Dump(DumpArgs),
}

#[derive(Subcommand, Debug)]
pub enum DpCommand {
    /// Show one department
    Get(DpGetArgs),

    /// Department id tree (department/simplelist)
    #[command(visible_alias = "list")]
    Ls(DpTreeArgs),

    /// Department tree with names (department/list)
    Tree(DpTreeArgs),
}

#[derive(Parser, Debug)]
pub struct DpGetArgs {
    /// Department id
    pub id: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct DpTreeArgs {
    /// Start department id (whole corp when omitted)
    pub id: Option<String>,

    /// Directory for the HTML report
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Show one member
    Get(UserGetArgs),

    /// List members of a department
    #[command(visible_alias = "list")]
    Ls(UserLsArgs),
}

#[derive(Parser, Debug)]
pub struct UserGetArgs {
    /// Member userid
    pub userid: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct UserLsArgs {
    /// Department id
    pub department_id: String,

    /// Include members of sub-departments
    #[arg(short, long)]
    pub recursive: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Directory for the CSV report
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Start department id (whole corp when omitted)
    pub id: Option<String>,

    /// Directory for the HTML and CSV reports
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}
