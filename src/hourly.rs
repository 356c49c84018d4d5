//! Hourly series windowing and paging
//!
//! The raw hourly series is a contiguous timeline beginning at hour 0 of
//! "today" in the location's local time. Windowing selects one day-sized
//! view of it by timestamp: callers supply the day labels consistent with
//! that timeline (index 0 = today).

use crate::models::HourlyRecord;
use chrono::{Days, NaiveDateTime, Timelike};

/// Hours in one day-bucket window
pub const HOURS_PER_DAY: usize = 24;

/// Entries shown per page in the hourly view
pub const PAGE_SIZE: usize = 5;

fn hour_floor(time: NaiveDateTime) -> NaiveDateTime {
    time.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// The device-local wall clock, for "Today" windowing
#[must_use]
pub fn current_local_time() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Slice the 24-hour window for `selected_day` out of the series.
///
/// "Today" starts at the current hour and runs up to 24 records (fewer if
/// the series ends sooner). Any other label is resolved to its position in
/// `available_days` and yields that calendar day's records; an unknown
/// label yields an empty slice.
#[must_use]
pub fn window_for<'a>(
    series: &'a [HourlyRecord],
    selected_day: &str,
    available_days: &[String],
    now: NaiveDateTime,
) -> &'a [HourlyRecord] {
    if selected_day == "Today" {
        let floor = hour_floor(now);
        let Some(start) = series.iter().position(|r| r.timestamp >= floor) else {
            return &[];
        };
        let end = (start + HOURS_PER_DAY).min(series.len());
        &series[start..end]
    } else {
        let Some(day_index) = available_days.iter().position(|d| d == selected_day) else {
            return &[];
        };
        let Some(first) = series.first() else {
            return &[];
        };
        let target = first.timestamp.date() + Days::new(day_index as u64);
        let Some(start) = series.iter().position(|r| r.timestamp.date() == target) else {
            return &[];
        };
        let len = series[start..]
            .iter()
            .take_while(|r| r.timestamp.date() == target)
            .count()
            .min(HOURS_PER_DAY);
        &series[start..start + len]
    }
}

/// Fixed-size pager over one day's window.
///
/// Navigation past either end is a clamped no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyPager {
    window_len: usize,
    page: usize,
}

impl HourlyPager {
    /// Pager over a window of `window_len` entries, starting at page 0
    #[must_use]
    pub fn new(window_len: usize) -> Self {
        Self {
            window_len,
            page: 0,
        }
    }

    /// Number of pages (`ceil(window_len / PAGE_SIZE)`)
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.window_len.div_ceil(PAGE_SIZE)
    }

    /// Current page index
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Advance one page, clamped at the last page
    pub fn next(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    /// Go back one page, clamped at the first page
    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Back to page 0 (used when the selected day changes)
    pub fn reset(&mut self, window_len: usize) {
        self.window_len = window_len;
        self.page = 0;
    }

    /// The current page's slice of the window
    #[must_use]
    pub fn page_slice<'a, T>(&self, window: &'a [T]) -> &'a [T] {
        let start = (self.page * PAGE_SIZE).min(window.len());
        let end = (start + PAGE_SIZE).min(window.len());
        &window[start..end]
    }
}
