//! Client-side availability planner: users, per-day availability and the
//! local cache that keeps them across restarts.

pub mod cache;
pub mod calendar;
pub mod error;
pub mod model;
pub mod palette;
pub mod session;
pub mod store;

pub use cache::{FileCache, LocalCache, MemoryCache, STORAGE_KEY};
pub use calendar::{DayCell, Marker, MonthView};
pub use error::{CacheError, PlannerError};
pub use model::{AvailabilityMap, DayKey, Snapshot};
pub use palette::{color_for, MarkerColor, PALETTE};
pub use session::{Session, SharedSecret, ViewedMonth};
pub use store::AvailabilityStore;
