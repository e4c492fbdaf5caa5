//! Output formatting module
//!
//! Tabular listings (table, CSV, JSON, YAML), console trees and the
//! HTML/CSV report files written by the dump commands.

pub mod common;
mod feishu;
pub mod report;
mod tree;
mod wechat;

pub use common::{escape_csv, mask_secret, print_json, print_yaml, CsvRecord};
pub use feishu::{
    output_feishu_department_detail, output_feishu_departments, output_feishu_user_detail,
    output_feishu_users, output_token_scope,
};
pub use tree::{print_tree, render_tree, TreeLabel};
pub use wechat::{output_wechat_departments, output_wechat_user_detail, output_wechat_users};
