//! Month grid for the availability calendar.

use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

use super::model::{DayKey, Snapshot};
use super::palette::{color_for, MarkerColor};
use super::session::ViewedMonth;

const TITLE_FORMAT: &[FormatItem<'static>] = format_description!("[month repr:long] [year]");

/// Today's date in the local timezone, or UTC when the offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub user: String,
    pub color: Option<MarkerColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u8,
    pub key: DayKey,
    pub markers: Vec<Marker>,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub title: String,
    /// Blank cells before day 1, Sunday first.
    pub leading_blanks: u8,
    pub days: Vec<DayCell>,
}

impl MonthView {
    pub fn build(
        viewed: ViewedMonth,
        snapshot: &Snapshot,
        today: Date,
    ) -> Result<Self, time::error::ComponentRange> {
        let first = Date::from_calendar_date(viewed.year, viewed.month, 1)?;
        let days_in_month = time::util::days_in_year_month(viewed.year, viewed.month);

        let mut days = Vec::with_capacity(usize::from(days_in_month));
        for day in 1..=days_in_month {
            let date = first.replace_day(day)?;
            let key = DayKey::from_date(date);
            let markers = snapshot
                .availability
                .users_on(&key)
                .iter()
                .map(|user| Marker {
                    user: user.clone(),
                    color: color_for(&snapshot.users, user),
                })
                .collect();
            days.push(DayCell {
                day,
                key,
                markers,
                is_today: viewed.contains(today) && today.day() == day,
            });
        }

        Ok(Self {
            title: first
                .format(TITLE_FORMAT)
                .unwrap_or_else(|_| format!("{} {}", viewed.month, viewed.year)),
            leading_blanks: first.weekday().number_days_from_sunday(),
            days,
        })
    }

    pub fn cell(&self, day: u8) -> Option<&DayCell> {
        self.days.iter().find(|c| c.day == day)
    }
}
