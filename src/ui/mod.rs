//! UI utilities for terminal output
//!
//! This module provides user interface components like progress spinners
//! and credential prompts.

mod prompt;
mod spinner;

pub use prompt::{prompt_secret, prompt_value};
pub use spinner::{create_spinner, finish_spinner, finish_spinner_with_status, set_spinner_message};
