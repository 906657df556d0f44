//! End-to-end checks over a recorded planner response: parse it, index it by
//! day, drive the view state with key presses and draw it.

use canvas_tui::api::{resolve_url, PlannerItem};
use canvas_tui::app::{Action, App, Effect};
use canvas_tui::schedule::{Schedule, PERSONAL_COURSE};
use canvas_tui::view;
use chrono::{FixedOffset, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::{backend::TestBackend, Terminal};
use reqwest::Url;

const FIXTURE: &str = include_str!("fixtures/planner_items.json");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture_schedule() -> Schedule {
    let items: Vec<PlannerItem> = serde_json::from_str(FIXTURE).expect("fixture parses");
    let base = Url::parse("https://canvas.example.edu").unwrap();
    let utc_minus_5 = FixedOffset::west_opt(5 * 3600).unwrap();
    Schedule::build(items, &utc_minus_5, |href| resolve_url(&base, href))
}

fn press(app: &mut App, code: KeyCode) -> Option<Effect> {
    let action = Action::from_key(KeyEvent::new(code, KeyModifiers::NONE))?;
    app.update(action)
}

fn screen(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(90, 14)).unwrap();
    let now = date(2024, 10, 17).and_hms_opt(9, 0, 0).unwrap();
    terminal.draw(|frame| view::render(frame, app, now)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn fixture_is_bucketed_by_local_day() {
    let schedule = fixture_schedule();

    let days: Vec<_> = schedule
        .days()
        .iter()
        .map(|day| {
            let titles: Vec<_> = day.assignments.iter().map(|a| a.title.as_str()).collect();
            (day.date, titles)
        })
        .collect();
    assert_eq!(
        days,
        vec![
            (date(2024, 10, 17), vec!["Reading Quiz 7"]),
            (date(2024, 10, 18), vec!["Lab 4: Linked Lists"]),
            (date(2024, 10, 20), vec!["Week 8 discussion"]),
            (date(2024, 10, 22), vec!["Buy lab goggles"]),
        ]
    );
    // The undated assignment is dropped.
    assert_eq!(schedule.assignment_count(), 4);

    let quiz = &schedule.days()[0].assignments[0];
    assert_eq!(quiz.course, "HIST-110");
    assert_eq!(quiz.due.format("%H:%M").to_string(), "23:59");
    assert_eq!(quiz.kind.as_deref(), Some("quiz"));
    assert!(!quiz.submitted);

    let lab = &schedule.days()[1].assignments[0];
    assert!(lab.submitted);
    assert_eq!(
        lab.url.as_deref(),
        Some("https://canvas.example.edu/courses/4021/assignments/88101")
    );

    assert_eq!(schedule.days()[3].assignments[0].course, PERSONAL_COURSE);
}

#[test]
fn paging_through_days_and_opening() {
    let mut app = App::new(date(2024, 10, 17));
    app.apply_fetch(Ok(fixture_schedule()));

    let first = screen(&app);
    assert!(first.contains("Thursday Oct 17 (today)"), "{first}");
    assert!(first.contains("Reading Quiz 7"));
    assert!(first.contains("1/4"));

    assert_eq!(press(&mut app, KeyCode::Char('l')), None);
    let second = screen(&app);
    assert!(second.contains("Friday Oct 18 (tomorrow)"), "{second}");
    assert!(second.contains("10:59 ✓"));
    assert_eq!(
        press(&mut app, KeyCode::Char('o')),
        Some(Effect::OpenUrl(
            "https://canvas.example.edu/courses/4021/assignments/88101".into()
        ))
    );

    press(&mut app, KeyCode::Char('G'));
    assert!(screen(&app).contains("Tuesday Oct 22"));
    press(&mut app, KeyCode::Char('l'));
    assert_eq!(app.day_index(), 3);

    press(&mut app, KeyCode::Char('g'));
    press(&mut app, KeyCode::Char('h'));
    assert_eq!(app.day_index(), 0);

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}
