//! Config command handlers

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use log::debug;

use crate::cli::{ConfigAction, SetTarget, UnsetTarget};
use crate::error::{OrgError, Result};
use crate::output::mask_secret;
use crate::ui::{prompt_secret, prompt_value};

use super::models::{AppCredentials, CorpCredentials, SessionConfig};
use super::runtime::Session;

/// Dispatch config subcommands
pub fn run_config_command(
    session: &mut Session,
    action: &ConfigAction,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Set { target } => run_config_set(session, target)?,
        ConfigAction::Unset {
            target: UnsetTarget::Proxy,
        } => {
            session.set_proxy(None)?;
            println!("✓ Proxy removed");
        }
        ConfigAction::View(args) => {
            if args.raw {
                println!("{}", serde_json::to_string_pretty(session.config())?);
            } else {
                print_config(session);
            }
        }
    }
    Ok(())
}

fn run_config_set(session: &mut Session, target: &SetTarget) -> Result<()> {
    let batch = session.settings().batch;
    match target {
        SetTarget::Feishu => {
            let current = session.config().feishu.clone().unwrap_or_default();
            let flags = session.flags();
            let app_id = take_value(flags.app_id.as_deref(), "--app-id", batch, || {
                prompt_value("Feishu app id", Some(&current.app_id))
            })?;
            let app_secret = take_value(flags.app_secret.as_deref(), "--app-secret", batch, || {
                prompt_secret("Feishu app secret")
            })?;
            session.set_feishu(AppCredentials { app_id, app_secret })?;
            println!("✓ Feishu credentials saved to {}", session.store().path().display());
        }
        SetTarget::Wechat => {
            let current = session.config().wechat.clone().unwrap_or_default();
            let flags = session.flags();
            let corp_id = take_value(flags.corp_id.as_deref(), "--corp-id", batch, || {
                prompt_value("WeChat Work corp id", Some(&current.corp_id))
            })?;
            let corp_secret =
                take_value(flags.corp_secret.as_deref(), "--corp-secret", batch, || {
                    prompt_secret("WeChat Work corp secret")
                })?;
            session.set_wechat(CorpCredentials {
                corp_id,
                corp_secret,
            })?;
            println!("✓ WeChat Work credentials saved to {}", session.store().path().display());
        }
        SetTarget::Proxy { url } => {
            let url = url.trim();
            if url.is_empty() {
                return Err(OrgError::Validation("proxy URL must not be empty".to_string()));
            }
            session.set_proxy(Some(url.to_string()))?;
            println!("✓ Proxy set to {}", url);
        }
    }
    Ok(())
}

/// Value from a flag, else from `prompt` unless running in batch mode
fn take_value<F>(flag: Option<&str>, name: &str, batch: bool, prompt: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    if let Some(value) = flag {
        debug!("Using {} from command line", name);
        return Ok(value.to_string());
    }
    if batch {
        return Err(OrgError::Validation(format!(
            "{} is required in batch mode",
            name
        )));
    }
    prompt()
}

fn config_rows(config: &SessionConfig) -> Vec<[String; 3]> {
    let feishu = config.feishu.as_ref();
    let wechat = config.wechat.as_ref();
    vec![
        [
            "feishu".to_string(),
            feishu.map_or_else(|| "<not set>".to_string(), |c| c.app_id.clone()),
            mask_secret(feishu.map(|c| c.app_secret.as_str())),
        ],
        [
            "wechat".to_string(),
            wechat.map_or_else(|| "<not set>".to_string(), |c| c.corp_id.clone()),
            mask_secret(wechat.map(|c| c.corp_secret.as_str())),
        ],
    ]
}

fn print_config(session: &Session) {
    let config = session.config();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("BACKEND"), Cell::new("ID"), Cell::new("SECRET")]);
    for row in config_rows(config) {
        table.add_row(row.to_vec());
    }

    println!("Config file: {}", session.store().path().display());
    println!("Proxy: {}", config.proxy.as_deref().unwrap_or("<not set>"));
    println!("{table}");
}
