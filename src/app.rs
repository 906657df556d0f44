// View state: which day is on screen, which row is selected on each day,
// and what the last fetch produced. No terminal or network access here;
// side effects come back to the event loop as `Effect`s.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::schedule::{Assignment, Day, Schedule};

/// Result of one background fetch, as handed to [`App::apply_fetch`].
pub type FetchResult = Result<Schedule, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(Schedule),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextAssignment,
    PrevAssignment,
    NextDay,
    PrevDay,
    FirstDay,
    LastDay,
    Open,
    Refresh,
}

/// Work the event loop has to carry out on behalf of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenUrl(String),
    Refresh,
}

impl Action {
    /// Map a key press to an action. Releases and repeats are ignored.
    pub fn from_key(key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                _ => None,
            };
        }
        let action = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::NextAssignment,
            KeyCode::Char('k') | KeyCode::Up => Action::PrevAssignment,
            KeyCode::Char('l') | KeyCode::Right => Action::NextDay,
            KeyCode::Char('h') | KeyCode::Left => Action::PrevDay,
            KeyCode::Char('g') => Action::FirstDay,
            KeyCode::Char('G') => Action::LastDay,
            KeyCode::Char('o') | KeyCode::Enter => Action::Open,
            KeyCode::Char('r') => Action::Refresh,
            _ => return None,
        };
        Some(action)
    }
}

pub struct App {
    load: LoadState,
    day_index: usize,
    /// Selected row per day, parallel to the schedule's days.
    selections: Vec<usize>,
    refreshing: bool,
    status: Option<String>,
    should_quit: bool,
    today: NaiveDate,
}

impl App {
    /// A fresh view waiting for its first fetch. `today` is used for the
    /// "(today)"/"(tomorrow)" labels.
    pub fn new(today: NaiveDate) -> Self {
        App {
            load: LoadState::Loading,
            day_index: 0,
            selections: Vec::new(),
            refreshing: false,
            status: None,
            should_quit: false,
            today,
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match &self.load {
            LoadState::Loaded(schedule) => Some(schedule),
            _ => None,
        }
    }

    pub fn day_index(&self) -> usize {
        self.day_index
    }

    pub fn current_day(&self) -> Option<&Day> {
        self.schedule()?.day(self.day_index)
    }

    /// Selected row on the current day.
    pub fn selected_row(&self) -> Option<usize> {
        self.current_day()?;
        self.selections.get(self.day_index).copied()
    }

    pub fn selected_assignment(&self) -> Option<&Assignment> {
        let row = self.selected_row()?;
        self.current_day()?.assignments.get(row)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Apply one user action. Anything that needs the outside world is
    /// returned instead of performed.
    pub fn update(&mut self, action: Action) -> Option<Effect> {
        // A keypress dismisses the previous message.
        self.status = None;
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextAssignment => self.move_selection(1),
            Action::PrevAssignment => self.move_selection(-1),
            Action::NextDay => self.set_day(self.day_index.saturating_add(1)),
            Action::PrevDay => self.set_day(self.day_index.saturating_sub(1)),
            Action::FirstDay => self.set_day(0),
            Action::LastDay => self.set_day(usize::MAX),
            Action::Open => return self.open_selected(),
            Action::Refresh => {
                if self.refreshing || self.load == LoadState::Loading {
                    debug!("refresh ignored; a fetch is already running");
                    return None;
                }
                self.refreshing = true;
                if matches!(self.load, LoadState::Failed(_)) {
                    self.load = LoadState::Loading;
                }
                return Some(Effect::Refresh);
            }
        }
        None
    }

    /// Take in the outcome of a background fetch.
    pub fn apply_fetch(&mut self, result: FetchResult) {
        self.refreshing = false;
        match result {
            Ok(schedule) => {
                let viewed = self.current_day().map(|day| day.date);
                self.day_index = viewed
                    .and_then(|date| schedule.position_of(date))
                    .unwrap_or(0);
                self.selections = vec![0; schedule.len()];
                if self.load != LoadState::Loading {
                    self.status = Some(format!(
                        "Updated: {} assignments",
                        schedule.assignment_count()
                    ));
                }
                self.load = LoadState::Loaded(schedule);
            }
            Err(message) => {
                warn!(error = %message, "fetch failed");
                if self.schedule().is_some() {
                    self.status = Some(format!("Refresh failed: {message}"));
                } else {
                    self.load = LoadState::Failed(message);
                }
            }
        }
    }

    /// Called when a refresh effect could not even be started.
    pub fn refresh_aborted(&mut self, message: impl Into<String>) {
        self.refreshing = false;
        self.status = Some(message.into());
    }

    fn set_day(&mut self, index: usize) {
        let Some(schedule) = self.schedule() else {
            return;
        };
        let Some(last) = schedule.len().checked_sub(1) else {
            return;
        };
        self.day_index = index.min(last);
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(len) = self.current_day().map(|day| day.assignments.len()) else {
            return;
        };
        if len == 0 {
            return;
        }
        if let Some(row) = self.selections.get_mut(self.day_index) {
            *row = row.saturating_add_signed(delta).min(len - 1);
        }
    }

    fn open_selected(&mut self) -> Option<Effect> {
        let assignment = self.selected_assignment()?;
        if let Some(url) = &assignment.url {
            return Some(Effect::OpenUrl(url.clone()));
        }
        let message = format!("\"{}\" has no web page", assignment.title);
        self.status = Some(message);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PlannerItem;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Two assignments on the 18th, one on the 20th, one on the 22nd.
    fn schedule() -> Schedule {
        let items: Vec<PlannerItem> = serde_json::from_value(json!([
            { "context_name": "CS 101", "html_url": "/a/1",
              "plannable": { "title": "Lab", "due_at": "2024-10-18T10:00:00Z" } },
            { "context_name": "CS 101",
              "plannable": { "title": "No link", "due_at": "2024-10-18T12:00:00Z" } },
            { "context_name": "HIST 1", "html_url": "/a/3",
              "plannable": { "title": "Essay", "due_at": "2024-10-20T10:00:00Z" } },
            { "context_name": "MATH 2", "html_url": "/a/4",
              "plannable": { "title": "Set 5", "due_at": "2024-10-22T10:00:00Z" } }
        ]))
        .unwrap();
        Schedule::build(items, &Utc, |href| Some(format!("https://school.test{href}")))
    }

    fn loaded_app() -> App {
        let mut app = App::new(date(2024, 10, 18));
        app.apply_fetch(Ok(schedule()));
        app
    }

    #[test]
    fn keymap() {
        assert_eq!(Action::from_key(key(KeyCode::Char('j'))), Some(Action::NextAssignment));
        assert_eq!(Action::from_key(key(KeyCode::Up)), Some(Action::PrevAssignment));
        assert_eq!(Action::from_key(key(KeyCode::Char('l'))), Some(Action::NextDay));
        assert_eq!(Action::from_key(key(KeyCode::Left)), Some(Action::PrevDay));
        assert_eq!(Action::from_key(key(KeyCode::Char('G'))), Some(Action::LastDay));
        assert_eq!(Action::from_key(key(KeyCode::Enter)), Some(Action::Open));
        assert_eq!(Action::from_key(key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(Action::from_key(key(KeyCode::Char('x'))), None);
        assert_eq!(
            Action::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(Action::from_key(release), None);
    }

    #[test]
    fn starts_loading_and_ignores_navigation() {
        let mut app = App::new(date(2024, 10, 18));
        assert_eq!(app.load_state(), &LoadState::Loading);
        assert_eq!(app.update(Action::NextDay), None);
        assert_eq!(app.update(Action::NextAssignment), None);
        assert_eq!(app.update(Action::Open), None);
        assert_eq!(app.update(Action::Refresh), None);
        assert_eq!(app.day_index(), 0);
        assert_eq!(app.selected_row(), None);
    }

    #[test]
    fn day_paging_saturates_at_both_ends() {
        let mut app = loaded_app();
        app.update(Action::PrevDay);
        assert_eq!(app.day_index(), 0);
        for _ in 0..5 {
            app.update(Action::NextDay);
        }
        assert_eq!(app.day_index(), 2);
        assert_eq!(app.current_day().unwrap().date, date(2024, 10, 22));
        app.update(Action::FirstDay);
        assert_eq!(app.day_index(), 0);
        app.update(Action::LastDay);
        assert_eq!(app.day_index(), 2);
    }

    #[test]
    fn each_day_keeps_its_own_selection() {
        let mut app = loaded_app();
        app.update(Action::NextAssignment);
        app.update(Action::NextAssignment);
        assert_eq!(app.selected_row(), Some(1));
        app.update(Action::PrevAssignment);
        app.update(Action::PrevAssignment);
        assert_eq!(app.selected_row(), Some(0));
        app.update(Action::NextAssignment);

        app.update(Action::NextDay);
        assert_eq!(app.selected_row(), Some(0));
        app.update(Action::PrevDay);
        assert_eq!(app.selected_assignment().unwrap().title, "No link");
    }

    #[test]
    fn open_returns_link_or_explains_why_not() {
        let mut app = loaded_app();
        assert_eq!(
            app.update(Action::Open),
            Some(Effect::OpenUrl("https://school.test/a/1".into()))
        );

        app.update(Action::NextAssignment);
        assert_eq!(app.update(Action::Open), None);
        assert_eq!(app.status(), Some("\"No link\" has no web page"));

        app.update(Action::NextDay);
        assert_eq!(app.status(), None);
    }

    #[test]
    fn refresh_keeps_viewed_date() {
        let mut app = loaded_app();
        app.update(Action::NextDay);
        assert_eq!(app.update(Action::Refresh), Some(Effect::Refresh));
        assert!(app.is_refreshing());
        assert_eq!(app.update(Action::Refresh), None);

        app.apply_fetch(Ok(schedule()));
        assert!(!app.is_refreshing());
        assert_eq!(app.current_day().unwrap().date, date(2024, 10, 20));
        assert_eq!(app.status(), Some("Updated: 4 assignments"));
    }

    #[test]
    fn refresh_moves_to_next_date_when_viewed_one_is_gone() {
        let mut app = loaded_app();
        app.update(Action::NextDay);
        app.update(Action::Refresh);

        let items: Vec<PlannerItem> = serde_json::from_value(json!([
            { "plannable": { "title": "a", "due_at": "2024-10-18T10:00:00Z" } },
            { "plannable": { "title": "b", "due_at": "2024-10-25T10:00:00Z" } }
        ]))
        .unwrap();
        app.apply_fetch(Ok(Schedule::build(items, &Utc, |_| None)));
        assert_eq!(app.current_day().unwrap().date, date(2024, 10, 25));
    }

    #[test]
    fn failed_first_fetch_is_shown() {
        let mut app = App::new(date(2024, 10, 18));
        app.apply_fetch(Err("Canvas rejected the access token".into()));
        assert_eq!(
            app.load_state(),
            &LoadState::Failed("Canvas rejected the access token".into())
        );
        assert_eq!(app.update(Action::Refresh), Some(Effect::Refresh));
    }

    #[test]
    fn failed_refresh_keeps_data() {
        let mut app = loaded_app();
        app.update(Action::Refresh);
        app.apply_fetch(Err("timed out".into()));
        assert!(app.schedule().is_some());
        assert_eq!(app.status(), Some("Refresh failed: timed out"));
        assert!(!app.is_refreshing());
    }

    #[test]
    fn empty_schedule_is_safe_to_navigate() {
        let mut app = App::new(date(2024, 10, 18));
        app.apply_fetch(Ok(Schedule::default()));
        for action in [
            Action::NextDay,
            Action::LastDay,
            Action::NextAssignment,
            Action::PrevAssignment,
            Action::Open,
        ] {
            assert_eq!(app.update(action), None);
        }
        assert_eq!(app.current_day(), None);
        assert_eq!(app.status(), None);
    }

    #[test]
    fn quit() {
        let mut app = loaded_app();
        assert!(!app.should_quit());
        app.update(Action::Quit);
        assert!(app.should_quit());
    }
}
