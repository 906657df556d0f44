// UI layer: the terminal event loop. Fetches run on a background thread and
// report back over a channel; key presses become `Action`s on the `App`,
// and the `Effect`s it hands back are carried out here.

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{self, Event};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::app::{Action, App, Effect, FetchResult};
use crate::schedule::Schedule;
use crate::terminal::Tui;
use crate::{browser, view};

/// How long to wait for input before redrawing anyway.
const TICK: Duration = Duration::from_millis(250);

/// Run the viewer until the user quits. Blocks the calling thread.
pub fn run(api: ApiClient) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(Local::now().date_naive());
    spawn_fetch(&api, &tx).context("Failed to start fetch worker")?;

    let mut tui = Tui::enter()?;
    while !app.should_quit() {
        drain_fetches(&rx, &mut app);

        let now = Local::now();
        app.set_today(now.date_naive());
        tui.draw(|frame| view::render(frame, &app, now.naive_local()))
            .context("Failed to draw frame")?;

        if !event::poll(TICK).context("Failed to poll terminal events")? {
            continue;
        }
        let Event::Key(key) = event::read().context("Failed to read terminal event")? else {
            continue;
        };
        let Some(action) = Action::from_key(key) else {
            continue;
        };
        debug!(?action, "key action");

        match app.update(action) {
            Some(Effect::OpenUrl(url)) => {
                if let Err(err) = browser::open(&url) {
                    error!(error = %format!("{err:#}"), "browser open failed");
                    app.set_status(format!("{err:#}"));
                }
            }
            Some(Effect::Refresh) => {
                info!("refresh requested");
                if let Err(err) = spawn_fetch(&api, &tx) {
                    app.refresh_aborted(format!("Could not start refresh: {err}"));
                }
            }
            None => {}
        }
    }

    info!("quitting");
    Ok(())
}

/// Fetch and index everything due from today on, in local time.
fn fetch_schedule(api: &ApiClient) -> Result<Schedule> {
    let items = api.fetch_planner_items(Local::now().date_naive())?;
    Ok(Schedule::build(items, &Local, |href| api.resolve_url(href)))
}

fn spawn_fetch(api: &ApiClient, tx: &Sender<FetchResult>) -> std::io::Result<()> {
    let api = api.clone();
    let tx = tx.clone();
    thread::Builder::new()
        .name("canvas-fetch".into())
        .spawn(move || {
            let result = fetch_schedule(&api).map_err(|err| format!("{err:#}"));
            // Only fails once the UI loop has exited.
            let _ = tx.send(result);
        })?;
    Ok(())
}

fn drain_fetches(rx: &Receiver<FetchResult>, app: &mut App) {
    while let Ok(result) = rx.try_recv() {
        app.apply_fetch(result);
    }
}
