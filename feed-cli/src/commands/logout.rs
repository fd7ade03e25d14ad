//! Forget the stored token.

use anyhow::Result;
use photofeed_client::{CredentialStore, FileCredentialStore};

use crate::config::CliConfig;

/// Run the logout command.
///
/// Works without an access key so a stale token can always be removed.
pub fn run(config: &CliConfig) -> Result<()> {
    if config.client_config().is_ok() {
        super::open_session(config)?.logout();
    } else {
        let store = FileCredentialStore::new(config.credentials_path()?);
        store.clear()?;
    }

    println!("Logged out.");
    Ok(())
}
