// Schedule module: turns the flat list of planner items into an ordered
// sequence of days, each holding that day's assignments.

use chrono::{NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;
use tracing::debug;

use crate::api::PlannerItem;

/// Course label used for items that belong to no course (planner notes).
pub const PERSONAL_COURSE: &str = "Personal";
const UNTITLED: &str = "Untitled";

/// A single thing that is due, already converted to local wall time.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub course: String,
    pub title: String,
    pub due: NaiveDateTime,
    pub url: Option<String>,
    pub submitted: bool,
    /// Canvas `plannable_type` (`assignment`, `quiz`, ...).
    pub kind: Option<String>,
}

/// All assignments due on one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct Day {
    pub date: NaiveDate,
    pub assignments: Vec<Assignment>,
}

/// Days in ascending date order. Days without assignments never appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    days: Vec<Day>,
}

impl Schedule {
    /// Bucket `items` by their due date in `tz`. `resolve` turns an item's
    /// `html_url` into the link opened in the browser.
    pub fn build<Tz, F>(items: Vec<PlannerItem>, tz: &Tz, resolve: F) -> Self
    where
        Tz: TimeZone,
        F: Fn(&str) -> Option<String>,
    {
        let mut buckets: BTreeMap<NaiveDate, Vec<Assignment>> = BTreeMap::new();

        for item in items {
            let Some(due) = item.due() else {
                debug!(title = ?item.plannable.title, "skipping planner item without a date");
                continue;
            };
            let due = due.with_timezone(tz).naive_local();
            let submitted = item.is_submitted();
            let url = item.html_url.as_deref().and_then(&resolve);
            let course = course_label(item.context_name.as_deref());
            let title = item
                .plannable
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());

            buckets.entry(due.date()).or_default().push(Assignment {
                course,
                title,
                due,
                url,
                submitted,
                kind: item.plannable_type,
            });
        }

        let days = buckets
            .into_iter()
            .map(|(date, mut assignments)| {
                assignments.sort_by(|a, b| {
                    a.due
                        .cmp(&b.due)
                        .then_with(|| a.course.cmp(&b.course))
                        .then_with(|| a.title.cmp(&b.title))
                });
                Day { date, assignments }
            })
            .collect();

        Schedule { days }
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day(&self, index: usize) -> Option<&Day> {
        self.days.get(index)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Index of the first day on or after `date`.
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|day| day.date >= date)
    }

    pub fn assignment_count(&self) -> usize {
        self.days.iter().map(|day| day.assignments.len()).sum()
    }
}

/// Short course label: the first two words of the course name joined with
/// a dash, so `"CS 101 Intro to Programming"` becomes `"CS-101"`.
pub fn course_label(context_name: Option<&str>) -> String {
    let label = context_name
        .unwrap_or_default()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join("-");
    if label.is_empty() {
        PERSONAL_COURSE.to_string()
    } else {
        label
    }
}
