use tracing::{debug, info, instrument, warn};

use super::cache::{FileCache, LocalCache, STORAGE_KEY};
use super::calendar::{today, MonthView};
use super::error::PlannerError;
use super::model::{DayKey, Snapshot};
use super::palette::{color_for, MarkerColor};
use super::session::{Session, SharedSecret, ViewedMonth};
use crate::config::PlannerConfig;

/// Owns the planner snapshot and the session, and writes the full snapshot
/// to the local cache after every mutation.
///
/// Operations take `&mut self` and finish before returning, so two
/// mutations can never interleave. Errors are recorded in
/// [`Session::error`] as well as returned.
pub struct AvailabilityStore {
    snapshot: Snapshot,
    session: Session,
    secret: SharedSecret,
    cache: Box<dyn LocalCache>,
}

impl std::fmt::Debug for AvailabilityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityStore")
            .field("snapshot", &self.snapshot)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AvailabilityStore {
    /// An empty store. Nothing is read from the cache.
    pub fn new(cache: Box<dyn LocalCache>, secret: SharedSecret) -> Self {
        Self {
            snapshot: Snapshot::default(),
            session: Session::new(ViewedMonth::containing(today())),
            secret,
            cache,
        }
    }

    /// A store primed from the cache. A failed load leaves the warning in
    /// the session and the planner empty.
    pub fn open(cache: Box<dyn LocalCache>, secret: SharedSecret) -> Self {
        let mut store = Self::new(cache, secret);
        let _ = store.load();
        store
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::open(
            Box::new(FileCache::new(&config.cache_dir)),
            SharedSecret::new(config.secret.clone()),
        )
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn users(&self) -> &[String] {
        &self.snapshot.users
    }

    pub fn selected_user(&self) -> Option<&str> {
        self.session.selected_user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// The transient message to show, if any.
    pub fn message(&self) -> Option<&str> {
        self.session.error.as_deref()
    }

    pub fn set_username_draft(&mut self, draft: impl Into<String>) {
        self.session.username_draft = draft.into();
    }

    pub fn authenticate(&mut self, candidate: &str) -> Result<(), PlannerError> {
        if !self.secret.matches(candidate) {
            warn!("authentication failed");
            return self.fail(PlannerError::IncorrectSecret);
        }
        self.session.authenticated = true;
        self.session.error = None;
        info!("authenticated");
        Ok(())
    }

    pub fn logout(&mut self) {
        self.session.authenticated = false;
        info!("logged out");
    }

    #[instrument(skip(self))]
    pub fn add_user(&mut self, name: &str) -> Result<(), PlannerError> {
        if self.snapshot.contains_user(name) {
            warn!("duplicate username");
            return self.fail(PlannerError::DuplicateUsername);
        }
        if name.is_empty() {
            return self.fail(PlannerError::EmptyUsername);
        }

        self.snapshot.users.push(name.to_string());
        self.session.selected_user = Some(name.to_string());
        self.session.username_draft.clear();
        self.session.error = None;
        info!(users = self.snapshot.users.len(), "user added");
        self.persist_or_warn();
        Ok(())
    }

    /// Adds whatever is in the username draft.
    pub fn add_user_from_draft(&mut self) -> Result<(), PlannerError> {
        let name = self.session.username_draft.clone();
        self.add_user(&name)
    }

    /// Selects an existing user. Unknown names leave the selection alone.
    pub fn select_user(&mut self, name: &str) -> bool {
        if !self.snapshot.contains_user(name) {
            debug!(name, "select ignored for unknown user");
            return false;
        }
        self.session.selected_user = Some(name.to_string());
        true
    }

    #[instrument(skip(self))]
    pub fn delete_user(&mut self, name: &str) {
        self.snapshot.users.retain(|u| u != name);
        let days = self.snapshot.availability.remove_user(name);
        if self.session.is_selected(name) {
            self.session.selected_user = None;
        }
        info!(days, "user deleted");
        self.persist_or_warn();
    }

    /// Toggles the selected user on `day`.
    #[instrument(skip(self, day), fields(day = %day))]
    pub fn toggle_availability(&mut self, day: &DayKey) -> Result<(), PlannerError> {
        let Some(user) = self.session.selected_user.clone() else {
            warn!("toggle without a selected user");
            return self.fail(PlannerError::NoUserSelected);
        };

        let available = self.snapshot.availability.toggle(day, &user);
        self.session.error = None;
        info!(%user, available, "availability toggled");
        self.persist_or_warn();
        Ok(())
    }

    /// Toggles by raw `YYYY-MM-DD` key.
    pub fn toggle_day(&mut self, raw: &str) -> Result<(), PlannerError> {
        match DayKey::parse(raw) {
            Ok(day) => self.toggle_availability(&day),
            Err(e) => self.fail(e),
        }
    }

    /// Replaces the in-memory snapshot with the cached one.
    ///
    /// Missing or unreadable data resets to an empty planner and records
    /// [`PlannerError::LoadFailed`].
    pub fn load(&mut self) -> Result<(), PlannerError> {
        let raw = match self.cache.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("no saved planner data");
                return self.reset_after_failed_load();
            }
            Err(e) => {
                warn!(error = %e, "reading planner data failed");
                return self.reset_after_failed_load();
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(mut snapshot) => {
                snapshot.normalize();
                info!(
                    users = snapshot.users.len(),
                    days = snapshot.availability.len(),
                    "planner data loaded"
                );
                self.snapshot = snapshot;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "saved planner data is corrupt");
                self.reset_after_failed_load()
            }
        }
    }

    /// Writes the whole snapshot to the cache.
    pub fn persist(&self) -> Result<(), PlannerError> {
        let raw = serde_json::to_string(&self.snapshot).map_err(|e| {
            warn!(error = %e, "encoding planner data failed");
            PlannerError::SaveFailed
        })?;
        self.cache.set_item(STORAGE_KEY, &raw).map_err(|e| {
            warn!(error = %e, "writing planner data failed");
            PlannerError::SaveFailed
        })?;
        debug!(bytes = raw.len(), "planner data saved");
        Ok(())
    }

    pub fn color_of(&self, user: &str) -> Option<MarkerColor> {
        color_for(&self.snapshot.users, user)
    }

    pub fn viewed_month(&self) -> ViewedMonth {
        self.session.viewed_month
    }

    pub fn show_month(&mut self, month: ViewedMonth) {
        self.session.viewed_month = month;
    }

    pub fn change_month(&mut self, delta: i32) {
        self.session.viewed_month = self.session.viewed_month.shift(delta);
    }

    pub fn month_view(&self) -> Result<MonthView, time::error::ComponentRange> {
        MonthView::build(self.session.viewed_month, &self.snapshot, today())
    }

    fn fail(&mut self, err: PlannerError) -> Result<(), PlannerError> {
        self.session.error = Some(err.to_string());
        Err(err)
    }

    fn persist_or_warn(&mut self) {
        if let Err(e) = self.persist() {
            self.session.error = Some(e.to_string());
        }
    }

    fn reset_after_failed_load(&mut self) -> Result<(), PlannerError> {
        self.snapshot = Snapshot::default();
        self.fail(PlannerError::LoadFailed)
    }
}
