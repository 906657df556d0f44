// Rendering: draws the current `App` state into a ratatui frame. Pure with
// respect to the app; the only input besides it is the current time, used
// to mark past-due rows.

use chrono::{NaiveDate, NaiveDateTime};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Padding, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, LoadState};
use crate::schedule::{Assignment, Schedule};

const TITLE: &str = " CanvasTUI ";
const SUBMITTED_MARK: &str = "✓";
const HIGHLIGHT_SYMBOL: &str = "> ";
const KEY_HINTS: &str = "j/k move  h/l day  g/G first/last  o open  r refresh  q quit";

/// Draw the whole screen.
pub fn render(frame: &mut Frame, app: &App, now: NaiveDateTime) {
    let block = Block::default()
        .title(TITLE)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(Color::Blue))
        .padding(Padding::horizontal(1));
    let inner = block.inner(frame.area());
    frame.render_widget(block, frame.area());

    let [body, footer] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    match app.load_state() {
        LoadState::Loading => frame.render_widget(Paragraph::new("Waiting for data..."), body),
        LoadState::Failed(message) => render_error(frame, body, message),
        LoadState::Loaded(schedule) => render_schedule(frame, body, app, schedule, now),
    }
    render_footer(frame, footer, app);
}

fn render_schedule(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    schedule: &Schedule,
    now: NaiveDateTime,
) {
    let Some(day) = app.current_day() else {
        frame.render_widget(Paragraph::new("No upcoming assignments"), area);
        return;
    };

    let [date_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

    let heading = Line::from(vec![
        Span::styled(
            day.date.format("%A %b %-d").to_string(),
            Style::default().fg(Color::Magenta).bold(),
        ),
        Span::raw(relative_label(day.date, app.today())),
    ]);
    let position = format!("{}/{}", app.day_index() + 1, schedule.len());
    let [heading_area, position_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(text_width(&position))])
            .areas(date_area);
    frame.render_widget(Paragraph::new(heading), heading_area);
    frame.render_widget(
        Paragraph::new(position).alignment(Alignment::Right).fg(Color::DarkGray),
        position_area,
    );

    let header = ["Course", "Assignment", "Due"]
        .into_iter()
        .map(Cell::from)
        .collect::<Row>()
        .height(1)
        .style(Style::default().fg(Color::Magenta));
    let rows = day.assignments.iter().map(|a| {
        Row::new([
            Cell::from(a.course.clone()),
            Cell::from(title_line(a)),
            Cell::from(due_label(a)),
        ])
        .style(Style::default().fg(row_color(a, now)))
    });
    let table = Table::new(rows, ColumnWidths::measure(schedule).constraints())
        .header(header)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut state = TableState::default().with_selected(app.selected_row());
    frame.render_stateful_widget(table, table_area, &mut state);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::from("Could not load assignments".red().bold()),
        Line::default(),
        Line::from(message.to_string()),
        Line::default(),
        Line::from("Press r to retry or q to quit".dark_gray()),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(status) = app.status() {
        Line::from(status.to_string().yellow())
    } else if app.is_refreshing() {
        Line::from("Refreshing...".yellow())
    } else {
        Line::from(KEY_HINTS.dark_gray())
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn relative_label(date: NaiveDate, today: NaiveDate) -> &'static str {
    if date == today {
        " (today)"
    } else if today.succ_opt() == Some(date) {
        " (tomorrow)"
    } else {
        ""
    }
}

/// Short marker for planner items that are not plain assignments.
fn kind_label(kind: Option<&str>) -> Option<&'static str> {
    match kind? {
        "quiz" => Some("quiz"),
        "discussion_topic" => Some("discussion"),
        "planner_note" => Some("note"),
        "calendar_event" => Some("event"),
        "wiki_page" => Some("page"),
        "announcement" => Some("announcement"),
        _ => None,
    }
}

fn title_line(assignment: &Assignment) -> Line<'static> {
    let mut spans = vec![Span::raw(assignment.title.clone())];
    if let Some(label) = kind_label(assignment.kind.as_deref()) {
        spans.push(Span::styled(
            format!(" ({label})"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn due_label(assignment: &Assignment) -> String {
    let time = assignment.due.format("%H:%M");
    if assignment.submitted {
        format!("{time} {SUBMITTED_MARK}")
    } else {
        time.to_string()
    }
}

fn row_color(assignment: &Assignment, now: NaiveDateTime) -> Color {
    if assignment.submitted {
        Color::Green
    } else if assignment.due < now {
        Color::Red
    } else {
        Color::White
    }
}

/// Column widths measured over every day so the table does not shift
/// while paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnWidths {
    course: u16,
    title: u16,
    due: u16,
}

impl ColumnWidths {
    fn measure(schedule: &Schedule) -> Self {
        let mut widths = ColumnWidths {
            course: text_width("Course"),
            title: text_width("Assignment"),
            due: text_width("00:00 ") + text_width(SUBMITTED_MARK),
        };
        for assignment in schedule.days().iter().flat_map(|day| &day.assignments) {
            widths.course = widths.course.max(text_width(&assignment.course));
            let title = u16::try_from(title_line(assignment).width()).unwrap_or(u16::MAX);
            widths.title = widths.title.max(title);
        }
        widths
    }

    fn constraints(self) -> [Constraint; 3] {
        [
            Constraint::Length(self.course + 1),
            Constraint::Min(self.title + 2),
            Constraint::Length(self.due + 1),
        ]
    }
}

/// Columns a string occupies on screen; wide CJK and emoji count double.
fn text_width(text: &str) -> u16 {
    u16::try_from(Line::from(text).width()).unwrap_or(u16::MAX)
}
