//! WeChat Work contact API

mod api;
mod client;
mod commands;
pub mod models;

pub use client::WechatClient;
pub use commands::run_wechat_command;
pub use models::{Department, DepartmentName, SimpleDepartment, User, UserWithDepartments};
