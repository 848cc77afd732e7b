pub mod date;
pub mod filter;
pub mod view;

use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::{ApiError, EventsApi};
use crate::models::{Event, UserInfo};
use filter::FilterCategory;

// ─── Phase ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Syncing,
}

/// A sync can only start once the first event list has arrived, so there is
/// no "initializing while syncing" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Ready(Activity),
}

/// Where the user should be taken after a workflow finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

/// Unwraps a server result, substituting `fallback` and logging on failure.
/// This is the only place errors from the API are absorbed.
pub fn recover<T>(result: Result<T, ApiError>, fallback: T, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "{what} failed; using fallback");
            fallback
        }
    }
}

// ─── Controller ─────────────────────────────────────────────────────────────

/// View state for the dashboard screen. Network calls run on spawned tasks;
/// their results come back over oneshot channels and are applied by `poll`
/// (non-blocking, once per frame) or `settle` (waits for everything).
///
/// Dropping the dashboard drops the receivers, so anything still in flight
/// finishes and its result is discarded.
pub struct Dashboard<C> {
    api: Arc<C>,
    phase: Phase,
    events: Vec<Event>,
    user_info: UserInfo,
    filter: FilterCategory,
    events_rx: Option<oneshot::Receiver<Vec<Event>>>,
    user_rx: Option<oneshot::Receiver<UserInfo>>,
    sync_rx: Option<oneshot::Receiver<Vec<Event>>>,
}

impl<C: EventsApi + 'static> Dashboard<C> {
    /// Creates the state and starts the event and identity fetches side by
    /// side. Must be called from within a tokio runtime.
    pub fn mount(api: Arc<C>) -> Self {
        let mut dashboard = Self {
            api,
            phase: Phase::Initializing,
            events: Vec::new(),
            user_info: UserInfo::default(),
            filter: FilterCategory::default(),
            events_rx: None,
            user_rx: None,
            sync_rx: None,
        };
        dashboard.start_initial_load();
        dashboard
    }

    fn start_initial_load(&mut self) {
        info!("loading dashboard");

        let (tx, rx) = oneshot::channel();
        self.events_rx = Some(rx);
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let events = recover(api.list_events().await, Vec::new(), "listing events");
            let _ = tx.send(events);
        });

        let (tx, rx) = oneshot::channel();
        self.user_rx = Some(rx);
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let user = recover(api.get_user_info().await, UserInfo::default(), "fetching user info");
            let _ = tx.send(user);
        });
    }

    /// Triggers a server-side sync, then reloads the event list whatever the
    /// sync call returned. Returns `false` without touching the network when
    /// a sync is already running or the dashboard is still loading.
    pub fn start_sync(&mut self) -> bool {
        match self.phase {
            Phase::Ready(Activity::Idle) => {}
            Phase::Ready(Activity::Syncing) => {
                debug!("sync requested while one is running; ignoring");
                return false;
            }
            Phase::Initializing => {
                debug!("sync requested before first load finished; ignoring");
                return false;
            }
        }

        info!("starting sync");
        self.phase = Phase::Ready(Activity::Syncing);

        let (tx, rx) = oneshot::channel();
        self.sync_rx = Some(rx);
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            recover(api.trigger_sync().await, (), "email sync");
            let events = recover(api.list_events().await, Vec::new(), "reloading events");
            let _ = tx.send(events);
        });
        true
    }

    /// Ends the session on the server, then always sends the user to the
    /// login screen. The dashboard state goes away with `self`.
    pub async fn logout(self) -> Route {
        info!("logging out");
        recover(self.api.logout().await, (), "logout");
        Route::Login
    }

    pub fn set_filter(&mut self, category: FilterCategory) {
        self.filter = category;
    }

    /// Applies whatever results have arrived since the last call. Returns
    /// `true` when state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        if let Some(result) = try_take(&mut self.events_rx) {
            self.apply_initial_events(result.unwrap_or_default());
            changed = true;
        }
        if let Some(result) = try_take(&mut self.user_rx) {
            self.apply_user_info(result.unwrap_or_default());
            changed = true;
        }
        if let Some(result) = try_take(&mut self.sync_rx) {
            self.apply_synced_events(result.unwrap_or_default());
            changed = true;
        }

        changed
    }

    /// Waits for every in-flight call and applies the results.
    pub async fn settle(&mut self) {
        if let Some(rx) = self.events_rx.take() {
            self.apply_initial_events(wait_for(rx).await);
        }
        if let Some(rx) = self.user_rx.take() {
            self.apply_user_info(wait_for(rx).await);
        }
        if let Some(rx) = self.sync_rx.take() {
            self.apply_synced_events(wait_for(rx).await);
        }
    }

    fn apply_initial_events(&mut self, events: Vec<Event>) {
        info!(count = events.len(), "events loaded");
        self.events = events;
        self.phase = Phase::Ready(Activity::Idle);
    }

    fn apply_user_info(&mut self, user: UserInfo) {
        debug!(name = %user.name, "user info loaded");
        self.user_info = user;
    }

    fn apply_synced_events(&mut self, events: Vec<Event>) {
        info!(count = events.len(), "sync finished");
        self.events = events;
        self.phase = Phase::Ready(Activity::Idle);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase(), Phase::Initializing)
    }

    pub fn is_syncing(&self) -> bool {
        matches!(self.phase(), Phase::Ready(Activity::Syncing))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    pub fn filter(&self) -> FilterCategory {
        self.filter
    }
}

async fn wait_for<T: Default>(rx: oneshot::Receiver<T>) -> T {
    rx.await.unwrap_or_else(|_| {
        warn!("background request ended without a result");
        T::default()
    })
}

/// Non-blocking receive. `Some(Err(()))` means the task went away without
/// answering, which callers treat like a failed call.
fn try_take<T>(slot: &mut Option<oneshot::Receiver<T>>) -> Option<Result<T, ()>> {
    let rx = slot.as_mut()?;
    let result = match rx.try_recv() {
        Ok(value) => Ok(value),
        Err(oneshot::error::TryRecvError::Empty) => return None,
        Err(oneshot::error::TryRecvError::Closed) => {
            warn!("background request ended without a result");
            Err(())
        }
    };
    *slot = None;
    Some(result)
}
