//! Exchange an authorization code and load the account.

use anyhow::{Context, Result};
use photofeed_types::AuthCode;
use url::Url;

use crate::config::CliConfig;

/// Pick the code from `--code` or a pasted `--redirect` URL.
pub fn parse_code(code: Option<&str>, redirect: Option<&str>) -> Result<AuthCode> {
    match (code, redirect) {
        (Some(code), _) => {
            let code = code.trim();
            if code.is_empty() {
                anyhow::bail!("Authorization code is empty");
            }
            Ok(AuthCode::new(code))
        }
        (None, Some(redirect)) => {
            let url = Url::parse(redirect.trim()).context("Invalid redirect URL")?;
            AuthCode::from_redirect(&url)
                .context("Redirect URL does not contain an authorization code")
        }
        (None, None) => anyhow::bail!("Must specify either --code or --redirect"),
    }
}

/// Run the login command.
pub async fn run(config: &CliConfig, code: AuthCode) -> Result<()> {
    let session = super::open_session(config)?;

    match session.sign_in(code).await.context("Sign-in failed")? {
        Some(profile) => {
            println!("Signed in as {} ({})", profile.display_name, profile.login_handle);
            if let Some(avatar) = session.avatar().avatar_url() {
                println!("  Avatar: {avatar}");
            }
        }
        None => println!("Sign-in already in progress or code already used; nothing to do."),
    }
    Ok(())
}
