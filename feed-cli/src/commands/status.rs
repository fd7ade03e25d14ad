//! Show configuration and sign-in state.

use anyhow::Result;
use photofeed_client::{CredentialStore, FileCredentialStore};

use crate::config::{default_config_path, CliConfig};

/// Run the status command. Makes no network requests.
pub fn run(config: &CliConfig) -> Result<()> {
    println!("=== feed-cli status ===");
    println!();

    println!("Configuration:");
    match default_config_path() {
        Some(path) => println!("  Default file: {}", path.display()),
        None => println!("  Default file: (no home directory)"),
    }
    println!("  API:          {}", config.api.api_base_url);
    println!(
        "  Access key:   {}",
        if config.api.access_key.is_empty() {
            "NOT SET"
        } else {
            "set"
        }
    );
    println!("  Page size:    {}", config.api.per_page);
    println!();

    let path = config.credentials_path()?;
    let store = FileCredentialStore::new(&path);
    println!("Credentials:");
    println!("  File:   {}", path.display());
    if store.token().is_some() {
        println!("  Status: SIGNED IN");
    } else {
        println!("  Status: NOT SIGNED IN");
        println!();
        println!("Run 'feed-cli auth-url' and 'feed-cli login --code <CODE>' to sign in.");
    }

    Ok(())
}
