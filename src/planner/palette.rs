use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Pink,
    Indigo,
    Orange,
}

pub const PALETTE: [MarkerColor; 8] = [
    MarkerColor::Red,
    MarkerColor::Blue,
    MarkerColor::Green,
    MarkerColor::Yellow,
    MarkerColor::Purple,
    MarkerColor::Pink,
    MarkerColor::Indigo,
    MarkerColor::Orange,
];

/// Color for a user, by position in the user list.
///
/// Positional on purpose: deleting an earlier user shifts everyone after it.
pub fn color_for(users: &[String], user: &str) -> Option<MarkerColor> {
    users
        .iter()
        .position(|u| u == user)
        .map(|idx| PALETTE[idx % PALETTE.len()])
}
