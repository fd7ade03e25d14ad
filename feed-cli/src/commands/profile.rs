//! Show the signed-in user's profile.

use anyhow::{Context, Result};

use crate::config::CliConfig;

/// Run the profile command.
pub async fn run(config: &CliConfig) -> Result<()> {
    let session = super::open_session(config)?;
    if !session.is_authenticated() {
        anyhow::bail!("Not signed in. Run 'feed-cli login' first.");
    }

    let profile = session
        .restore()
        .await
        .context("Failed to load profile")?
        .context("Profile is already being loaded")?;

    println!("{}", profile.display_name);
    println!("  Handle: {}", profile.login_handle);
    if let Some(bio) = profile.bio.as_deref().filter(|b| !b.is_empty()) {
        println!("  Bio:    {bio}");
    }
    if let Some(avatar) = session.avatar().avatar_url() {
        println!("  Avatar: {avatar}");
    }
    Ok(())
}
