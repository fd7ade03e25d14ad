//! Print the authorization page URL.

use anyhow::Result;

use crate::config::CliConfig;

/// Run the auth-url command.
pub fn run(config: &CliConfig) -> Result<()> {
    let session = super::open_session(config)?;
    let url = session.authorize_url()?;

    println!("{url}");
    eprintln!();
    eprintln!("Open the URL above, approve access, then run:");
    eprintln!("  feed-cli login --code <CODE>");
    Ok(())
}
