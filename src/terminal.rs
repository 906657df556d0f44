// Terminal setup and teardown. `Tui` wraps ratatui's default terminal (raw
// mode, alternate screen, restoring panic hook) and restores it on drop.

use anyhow::{Context, Result};
use ratatui::DefaultTerminal;
use std::ops::{Deref, DerefMut};
use tracing::warn;

pub struct Tui {
    terminal: DefaultTerminal,
}

impl Tui {
    pub fn enter() -> Result<Self> {
        let terminal = ratatui::try_init().context("Failed to set up terminal")?;
        Ok(Tui { terminal })
    }
}

impl Deref for Tui {
    type Target = DefaultTerminal;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(err) = ratatui::try_restore() {
            warn!(error = %err, "failed to restore terminal");
        }
    }
}
