//! Month grid and date-range selection for the ticket date filter.

use crate::format::{format_api_date, format_display_date};
use chrono::{Datelike, Duration, NaiveDate};

pub const GRID_CELLS: usize = 42;

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub const WEEKDAY_NAMES: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// 42 cells, Sunday first: the tail of the previous month, the whole of
/// `month` (1-based) and the head of the next one. `None` for an invalid
/// month/year.
pub fn month_grid(year: i32, month: u32) -> Option<Vec<DayCell>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let lead = first.weekday().num_days_from_sunday() as i64;
    let start = first - Duration::days(lead);
    Some(
        start
            .iter_days()
            .take(GRID_CELLS)
            .map(|date| DayCell {
                date,
                in_month: date.month() == month && date.year() == year,
            })
            .collect(),
    )
}

/// Years offered by the year selector: five back, four ahead.
pub fn year_options(current: i32) -> Vec<i32> {
    (current - 5..current + 5).collect()
}

/// A committed `[start, end]` range, start never after end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn api_bounds(&self) -> (String, String) {
        (format_api_date(self.start), format_api_date(self.end))
    }
}

/// Label for the applied-filter chip, from the committed ISO strings.
pub fn describe_filter(start: &str, end: &str) -> Option<String> {
    match (start.is_empty(), end.is_empty()) {
        (false, false) => Some(format!(
            "De {} até {}",
            format_display_date(start),
            format_display_date(end)
        )),
        (false, true) => Some(format!("A partir de {}", format_display_date(start))),
        (true, false) => Some(format!("Até {}", format_display_date(end))),
        (true, true) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    StartOnly(NaiveDate),
    Complete(DateRange),
}

/// What a click did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Started(NaiveDate),
    /// The range is complete and should be committed; the picker asks to
    /// be collapsed.
    Completed(DateRange),
    Ignored,
}

/// Calendar widget state: the displayed month and the pending selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePicker {
    year: i32,
    month: u32,
    selection: Selection,
    open: bool,
}

impl RangePicker {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            selection: Selection::Empty,
            open: false,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn show_month(&mut self, year: i32, month: u32) {
        if (1..=12).contains(&month) {
            self.year = year;
            self.month = month;
        }
    }

    pub fn grid(&self) -> Vec<DayCell> {
        month_grid(self.year, self.month).unwrap_or_default()
    }

    /// Clicks on a cell; only days of the displayed month are selectable.
    pub fn click_cell(&mut self, cell: &DayCell) -> ClickOutcome {
        if cell.in_month {
            self.click(cell.date)
        } else {
            ClickOutcome::Ignored
        }
    }

    pub fn click(&mut self, date: NaiveDate) -> ClickOutcome {
        match self.selection {
            Selection::Empty | Selection::Complete(_) => {
                self.selection = Selection::StartOnly(date);
                ClickOutcome::Started(date)
            }
            Selection::StartOnly(start) => {
                let range = DateRange::new(start, date);
                self.selection = Selection::Complete(range);
                ClickOutcome::Completed(range)
            }
        }
    }

    pub fn is_highlighted(&self, date: NaiveDate) -> bool {
        match self.selection {
            Selection::Empty => false,
            Selection::StartOnly(start) => date == start,
            Selection::Complete(range) => range.start <= date && date <= range.end,
        }
    }

    /// Drops the pending selection and goes back to the month of `today`.
    pub fn clear(&mut self, today: NaiveDate) {
        self.selection = Selection::Empty;
        self.year = today.year();
        self.month = today.month();
    }
}
