//! Subcommand implementations.

pub mod areas;
pub mod completion;
pub mod config;
pub mod health;
pub mod projects;
pub mod session;
pub mod users;

use anyhow::{Context, Result, bail};
use client::{ApiClient, FileTokenStore, SessionStore};
use serde::Serialize;
use shared::config::ClientConfig;
use std::{
    io::{self, Write},
    sync::Arc,
};

use crate::terminal::TerminalNavigator;

/// How command results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON when `--json` was given, otherwise run `human`.
    pub fn emit<T: Serialize>(self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Build a session store backed by the on-disk token and restore it.
pub async fn connect(config: &ClientConfig) -> Result<SessionStore> {
    let tokens = match &config.token_path {
        Some(path) => FileTokenStore::new(path),
        None => FileTokenStore::in_config_dir().context("failed to locate token storage")?,
    };
    let api = ApiClient::new(config).context("failed to build HTTP client")?;
    let store = SessionStore::new(
        api,
        Arc::new(tokens),
        Arc::new(TerminalNavigator::default()),
    );
    store.restore().await;
    Ok(store)
}

/// Like [`connect`], but fails unless a stored session was accepted.
pub async fn signed_in(config: &ClientConfig) -> Result<SessionStore> {
    let store = connect(config).await?;
    if !store.is_authenticated() {
        bail!("not signed in; run `staffhub session login` first");
    }
    Ok(store)
}

pub fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}

/// Ask for confirmation unless `assume_yes` is set.
pub fn confirm(message: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{message} [y/N] ");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
