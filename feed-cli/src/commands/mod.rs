//! CLI command implementations.

pub mod auth_url;
pub mod feed;
pub mod like;
pub mod login;
pub mod logout;
pub mod profile;
pub mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use photofeed_client::{FileCredentialStore, Session};

use crate::config::CliConfig;

/// Build a session backed by the configured credentials file.
pub(crate) fn open_session(config: &CliConfig) -> Result<Session> {
    let client = config.client_config()?;
    let path = config.credentials_path()?;
    tracing::debug!("Using credentials at {}", path.display());
    let store = FileCredentialStore::new(path);
    Session::with_reqwest(client, Arc::new(store)).context("Failed to create session")
}
