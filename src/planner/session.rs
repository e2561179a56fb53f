use std::fmt;

use time::{Date, Month};

/// The one shared passphrase that unlocks the planner.
///
/// Not a per-user credential and not meant to be cryptographically strong.
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

/// The month currently shown in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewedMonth {
    pub year: i32,
    pub month: Month,
}

impl ViewedMonth {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn containing(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Moves by `delta` months, rolling the year over in either direction.
    pub fn shift(self, delta: i32) -> Self {
        let index = self.year * 12 + i32::from(u8::from(self.month)) - 1 + delta;
        let year = index.div_euclid(12);
        // rem_euclid(12) is always in 0..12
        let month = Month::January.nth_next(index.rem_euclid(12) as u8);
        Self { year, month }
    }

    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Per-run state that is never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub authenticated: bool,
    pub selected_user: Option<String>,
    pub viewed_month: ViewedMonth,
    pub username_draft: String,
    pub error: Option<String>,
}

impl Session {
    pub fn new(viewed_month: ViewedMonth) -> Self {
        Self {
            authenticated: false,
            selected_user: None,
            viewed_month,
            username_draft: String::new(),
            error: None,
        }
    }

    pub fn is_selected(&self, user: &str) -> bool {
        self.selected_user.as_deref() == Some(user)
    }
}
