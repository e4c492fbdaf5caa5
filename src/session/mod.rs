//! Session state: stored credentials, credential resolution and the
//! per-process [`Session`] handed to command handlers.

mod commands;
pub mod models;
mod resolve;
mod runtime;
mod store;

pub use commands::run_config_command;
pub use models::{AppCredentials, CorpCredentials, SessionConfig};
pub use resolve::{resolve_feishu, resolve_proxy, resolve_wechat, CredentialFlags};
pub use runtime::{Session, Settings};
pub use store::SessionStore;
