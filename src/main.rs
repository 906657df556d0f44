// Entrypoint for canvas-tui.
// - Configuration errors are printed before the terminal is taken over.
// - Logging failures are not fatal; the viewer runs without a log file.

use anyhow::Context;
use canvas_tui::{api::ApiClient, config::Config, logging, ui};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("canvas-tui needs CANVAS_URL and CANVAS_ACCESS_TOKEN")?;

    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let api = ApiClient::new(&config)?;
    let result = ui::run(api);
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "canvas-tui exited with an error");
    }
    result
}
