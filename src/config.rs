// Configuration module: the only settings are the Canvas instance URL and
// a personal access token, both read from the environment.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use std::fmt;

/// Environment variable holding the Canvas instance URL.
pub const URL_VAR: &str = "CANVAS_URL";
/// Environment variable holding the personal access token.
pub const TOKEN_VAR: &str = "CANVAS_ACCESS_TOKEN";

/// Credentials needed to talk to a Canvas instance.
#[derive(Clone)]
pub struct Config {
    pub base_url: Url,
    pub access_token: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Read `CANVAS_URL` and `CANVAS_ACCESS_TOKEN` from the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but against an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = required(&lookup, URL_VAR)?;
        let access_token = required(&lookup, TOKEN_VAR)?;

        let base_url = Url::parse(&raw_url)
            .with_context(|| format!("{URL_VAR} is not a valid URL: {raw_url}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("{URL_VAR} must be an http(s) URL, got: {raw_url}");
        }

        Ok(Config {
            base_url,
            access_token,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{key} is not set"))
}
