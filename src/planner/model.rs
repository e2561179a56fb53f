use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date};

use super::error::PlannerError;

const DAY_KEY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

fn has_day_key_shape(raw: &str) -> bool {
    lazy_static! {
        static ref DAY_KEY_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    DAY_KEY_RE.is_match(raw)
}

/// A local calendar day, written as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(Date);

impl DayKey {
    pub fn parse(raw: &str) -> Result<Self, PlannerError> {
        if !has_day_key_shape(raw) {
            return Err(PlannerError::InvalidDayKey(raw.to_string()));
        }
        Date::parse(raw, DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| PlannerError::InvalidDayKey(raw.to_string()))
    }

    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn date(&self) -> Date {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl TryFrom<String> for DayKey {
    type Error = PlannerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.to_string()
    }
}

/// Reads `null` the same way as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-day list of users who marked themselves available.
///
/// A day is never stored with an empty list and a user appears at most once
/// per day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityMap(BTreeMap<DayKey, Vec<String>>);

impl AvailabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users_on(&self, day: &DayKey) -> &[String] {
        self.0.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_available(&self, day: &DayKey, user: &str) -> bool {
        self.users_on(day).iter().any(|u| u == user)
    }

    /// Inserts `user` on `day` if absent, removes it if present.
    /// Returns whether the user is available afterwards.
    pub fn toggle(&mut self, day: &DayKey, user: &str) -> bool {
        let entry = self.0.entry(*day).or_default();
        let now_available = match entry.iter().position(|u| u == user) {
            Some(idx) => {
                entry.remove(idx);
                false
            }
            None => {
                entry.push(user.to_string());
                true
            }
        };
        if entry.is_empty() {
            self.0.remove(day);
        }
        now_available
    }

    /// Drops `user` from every day and prunes days left empty.
    /// Returns the number of days that listed the user.
    pub fn remove_user(&mut self, user: &str) -> usize {
        let mut touched = 0;
        self.0.retain(|_, users| {
            let before = users.len();
            users.retain(|u| u != user);
            if users.len() != before {
                touched += 1;
            }
            !users.is_empty()
        });
        touched
    }

    /// Restores the invariants on data that came from outside.
    pub fn normalize(&mut self) {
        self.0.retain(|_, users| {
            let mut seen = Vec::with_capacity(users.len());
            users.retain(|u| {
                if seen.contains(u) {
                    false
                } else {
                    seen.push(u.clone());
                    true
                }
            });
            !users.is_empty()
        });
    }

    pub fn days(&self) -> impl Iterator<Item = (&DayKey, &[String])> {
        self.0.iter().map(|(day, users)| (day, users.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything that gets persisted: the user list and the availability map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "nullable")]
    pub users: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub availability: AvailabilityMap,
}

impl Snapshot {
    pub fn contains_user(&self, name: &str) -> bool {
        self.users.iter().any(|u| u == name)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.users.iter().position(|u| u == name)
    }

    pub fn normalize(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.users.len());
        self.users.retain(|u| {
            if seen.contains(u) {
                false
            } else {
                seen.push(u.clone());
                true
            }
        });
        self.availability.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn day(raw: &str) -> DayKey {
        DayKey::parse(raw).expect("valid day key")
    }

    #[test]
    fn day_key_parses_and_formats_zero_padded() {
        let key = day("2024-06-01");
        assert_eq!(key.date(), date!(2024 - 06 - 01));
        assert_eq!(key.to_string(), "2024-06-01");
        assert_eq!(DayKey::from_date(date!(2025 - 01 - 09)).to_string(), "2025-01-09");
    }

    #[test]
    fn day_key_rejects_bad_shapes_and_impossible_dates() {
        for raw in ["2024-6-1", "24-06-01", "2024-02-30", "2024-13-01", "", "2024-06-01T00"] {
            assert_eq!(
                DayKey::parse(raw),
                Err(PlannerError::InvalidDayKey(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn toggle_twice_restores_previous_state() {
        let mut map = AvailabilityMap::new();
        let d = day("2024-06-01");
        map.toggle(&d, "Bob");
        let before = map.clone();

        assert!(map.toggle(&d, "Alice"));
        assert_eq!(map.users_on(&d), ["Bob", "Alice"]);
        assert!(!map.toggle(&d, "Alice"));
        assert_eq!(map, before);
    }

    #[test]
    fn toggle_off_last_user_prunes_day() {
        let mut map = AvailabilityMap::new();
        let d = day("2024-06-01");
        map.toggle(&d, "Alice");
        map.toggle(&d, "Alice");
        assert!(map.is_empty());
        assert!(map.users_on(&d).is_empty());
    }

    #[test]
    fn remove_user_only_touches_that_user() {
        let mut map = AvailabilityMap::new();
        let (d1, d2, d3) = (day("2024-06-01"), day("2024-06-02"), day("2024-06-03"));
        map.toggle(&d1, "Alice");
        map.toggle(&d2, "Alice");
        map.toggle(&d2, "Bob");
        map.toggle(&d3, "Bob");

        assert_eq!(map.remove_user("Alice"), 2);
        assert_eq!(map.len(), 2);
        assert!(map.users_on(&d1).is_empty());
        assert_eq!(map.users_on(&d2), ["Bob"]);
        assert_eq!(map.users_on(&d3), ["Bob"]);
    }

    #[test]
    fn snapshot_json_shape() {
        let mut snapshot = Snapshot {
            users: vec!["A".into()],
            ..Snapshot::default()
        };
        snapshot.availability.toggle(&day("2024-01-01"), "A");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "users": ["A"], "availability": { "2024-01-01": ["A"] } })
        );
    }

    #[test]
    fn snapshot_tolerates_missing_and_null_fields() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"users": null}"#).unwrap();
        assert_eq!(snapshot, Snapshot::default());

        let snapshot: Snapshot = serde_json::from_str(r#"{"users": ["A"]}"#).unwrap();
        assert_eq!(snapshot.users, ["A"]);
        assert!(snapshot.availability.is_empty());
    }

    #[test]
    fn snapshot_rejects_bad_day_keys() {
        let err = serde_json::from_str::<Snapshot>(r#"{"availability": {"June 1": ["A"]}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn normalize_drops_empty_days_and_duplicates() {
        let mut snapshot: Snapshot = serde_json::from_str(
            r#"{"users": ["A", "B", "A"],
                "availability": {"2024-01-01": [], "2024-01-02": ["A", "A", "B"]}}"#,
        )
        .unwrap();
        snapshot.normalize();

        assert_eq!(snapshot.users, ["A", "B"]);
        assert_eq!(snapshot.availability.len(), 1);
        assert_eq!(snapshot.availability.users_on(&day("2024-01-02")), ["A", "B"]);
    }
}
