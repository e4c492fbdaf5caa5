//! Feishu (Lark) contact API
//!
//! Tenant token issuance, department/user/scope endpoints, the walker
//! source used by `feishu dump`, and the command handlers.

mod api;
mod client;
mod commands;
pub mod models;

pub use client::FeishuClient;
pub use commands::run_feishu_command;
pub use models::{
    department_tree, AuthScope, Department, DepartmentWithNames, ScopeItem, User,
    UserWithDepartments,
};
