//! Interactive prompts for values missing from the command line

use dialoguer::{theme::ColorfulTheme, Input, Password};

use crate::error::{OrgError, Result};

/// Ask for a visible value; the current value (if any) is offered as default
pub fn prompt_value(prompt: &str, current: Option<&str>) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
    if let Some(current) = current.filter(|c| !c.is_empty()) {
        input = input.default(current.to_string());
    }
    input
        .interact_text()
        .map(|v| v.trim().to_string())
        .map_err(|e| OrgError::Config(format!("Failed to read {}: {}", prompt, e)))
}

/// Ask for a secret without echoing it
pub fn prompt_secret(prompt: &str) -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| OrgError::Config(format!("Failed to read {}: {}", prompt, e)))
}
