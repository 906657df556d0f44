// Opens assignment pages in the user's default browser.

use anyhow::{Context, Result};
use tracing::info;

/// Hand `url` to the OS default browser.
pub fn open(url: &str) -> Result<()> {
    info!(url, "opening in browser");
    webbrowser::open(url).with_context(|| format!("Could not open browser for {url}"))
}
