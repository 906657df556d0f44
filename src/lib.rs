// Library root
// -----------
// canvas-tui shows a Canvas user's upcoming assignments in the terminal,
// one day per page. The binary (`main.rs`) wires these modules together.
//
// Module responsibilities:
// - `config`: reads the instance URL and access token from the environment.
// - `api`: blocking HTTP client for the Canvas planner endpoint.
// - `schedule`: groups planner items into an ordered list of days.
// - `app`: view state and keybindings, free of terminal and network I/O.
// - `view`: draws the app state with ratatui.
// - `ui`: the event loop tying input, fetches and drawing together.
// - `terminal`, `browser`, `logging`: thin wrappers over the outside world.
pub mod api;
pub mod app;
pub mod browser;
pub mod config;
pub mod logging;
pub mod schedule;
pub mod terminal;
pub mod ui;
pub mod view;
