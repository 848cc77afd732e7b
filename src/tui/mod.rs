pub mod event;
pub mod ui;

use ratatui::widgets::ListState as RListState;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::warn;

use crate::api::{open_in_browser, EventsApi};
use crate::dashboard::filter::FilterCategory;
use crate::dashboard::view::EventCard;
use crate::dashboard::{Activity, Dashboard, Phase, Route};

// ─── Screens ────────────────────────────────────────────────────────────────

pub enum Screen<C> {
    Login,
    Dashboard(Dashboard<C>),
    /// Logout request in flight; the dashboard state is already gone.
    SigningOut,
}

// ─── App State ──────────────────────────────────────────────────────────────

pub struct App<C> {
    pub api: Arc<C>,
    pub running: bool,
    pub screen: Screen<C>,
    pub card_list_state: ListState,
    pub status_message: String,
    pub logout_rx: Option<oneshot::Receiver<Route>>,
    // Incremented each frame; used to drive the loading spinner.
    pub frame_count: u64,
}

/// Tracks logical selection plus a persistent ratatui scroll offset.
pub struct ListState {
    pub inner: RListState,
    pub selected: usize,
    pub len: usize,
}

impl ListState {
    pub fn new() -> Self {
        let mut inner = RListState::default();
        inner.select(Some(0));
        Self { inner, selected: 0, len: 0 }
    }

    /// Move down, clamped at the last item.
    pub fn select_next(&mut self) {
        if self.len > 0 && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    /// Move up, clamped at the first item.
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_last(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: EventsApi + 'static> App<C> {
    pub fn new(api: Arc<C>, start: Route) -> Self {
        let mut app = Self {
            api,
            running: true,
            screen: Screen::Login,
            card_list_state: ListState::new(),
            status_message: String::new(),
            logout_rx: None,
            frame_count: 0,
        };
        app.navigate(start);
        app
    }

    /// Entering the dashboard always mounts fresh state.
    pub fn navigate(&mut self, route: Route) {
        match route {
            Route::Login => {
                self.screen = Screen::Login;
                self.status_message = "Press l to sign in with Google, Enter to continue.".into();
            }
            Route::Dashboard => {
                self.screen = Screen::Dashboard(Dashboard::mount(Arc::clone(&self.api)));
                self.card_list_state = ListState::new();
                self.status_message = "Loading...".into();
            }
        }
    }

    pub fn dashboard(&self) -> Option<&Dashboard<C>> {
        match &self.screen {
            Screen::Dashboard(d) => Some(d),
            _ => None,
        }
    }

    pub fn dashboard_mut(&mut self) -> Option<&mut Dashboard<C>> {
        match &mut self.screen {
            Screen::Dashboard(d) => Some(d),
            _ => None,
        }
    }

    pub fn login(&mut self) {
        match self.api.initiate_google_login() {
            Ok(()) => {
                self.status_message =
                    "Finish signing in in your browser, then press Enter.".into();
            }
            Err(e) => {
                warn!(error = %e, "could not open sign-in page");
                self.status_message = format!("Could not open browser: {e}");
            }
        }
    }

    pub fn set_filter(&mut self, category: FilterCategory) {
        if let Some(dashboard) = self.dashboard_mut() {
            dashboard.set_filter(category);
            self.card_list_state.selected = 0;
            self.refresh_card_count();
        }
    }

    pub fn cycle_filter(&mut self, forward: bool) {
        if let Some(current) = self.dashboard().map(|d| d.filter()) {
            let next = if forward { current.next() } else { current.prev() };
            self.set_filter(next);
        }
    }

    pub fn start_sync(&mut self) {
        let Screen::Dashboard(dashboard) = &mut self.screen else {
            return;
        };
        if dashboard.start_sync() {
            self.status_message = "Syncing emails...".into();
        }
    }

    /// Moves the dashboard onto a background task that logs out; the
    /// result is picked up by `poll_background`.
    pub fn begin_logout(&mut self) {
        if !matches!(self.screen, Screen::Dashboard(_)) {
            return;
        }
        let Screen::Dashboard(dashboard) = std::mem::replace(&mut self.screen, Screen::SigningOut)
        else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        self.logout_rx = Some(rx);
        self.status_message = "Signing out...".into();
        tokio::spawn(async move {
            let route = dashboard.logout().await;
            let _ = tx.send(route);
        });
    }

    /// Applies finished background work without blocking.
    pub fn poll_background(&mut self) {
        if let Screen::Dashboard(dashboard) = &mut self.screen {
            let was_loading = dashboard.is_loading();
            let was_syncing = dashboard.is_syncing();
            let prev_user = dashboard.user_info().clone();
            if dashboard.poll() {
                let loaded = dashboard.events().len();
                let user_changed = dashboard.user_info() != &prev_user;
                if was_syncing && !dashboard.is_syncing() {
                    self.status_message = format!("Sync finished. {loaded} events.");
                } else if matches!(dashboard.phase(), Phase::Ready(Activity::Idle))
                    && (was_loading || user_changed)
                {
                    // Identity may land after the events; greet again when it does.
                    let name = dashboard.user_info().name.clone();
                    self.status_message = format!("Welcome, {name}! {loaded} events loaded.");
                }
                self.refresh_card_count();
            }
        }

        let finished = match self.logout_rx.as_mut() {
            None => return,
            Some(rx) => match rx.try_recv() {
                Ok(route) => route,
                Err(oneshot::error::TryRecvError::Empty) => return,
                // The logout task is gone; leave the dashboard anyway.
                Err(oneshot::error::TryRecvError::Closed) => Route::Login,
            },
        };
        self.logout_rx = None;
        self.navigate(finished);
    }

    fn refresh_card_count(&mut self) {
        if let Some(count) = self.dashboard().map(|d| d.view().cards.len()) {
            self.card_list_state.set_len(count);
        }
    }

    pub fn selected_card(&self) -> Option<EventCard> {
        let dashboard = self.dashboard()?;
        dashboard
            .view()
            .cards
            .into_iter()
            .nth(self.card_list_state.selected)
    }

    pub fn open_selected_link(&mut self) {
        let Some(card) = self.selected_card() else {
            return;
        };
        let Some(link) = card.action_link else {
            self.status_message = format!("{} has no link.", card.company);
            return;
        };
        match open_in_browser(&link) {
            Ok(()) => self.status_message = format!("Opened {link}"),
            Err(e) => {
                warn!(error = %e, "could not open action link");
                self.status_message = format!("Could not open browser: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{event, FakeApi};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    async fn poll_until(app: &mut App<FakeApi>, done: impl Fn(&App<FakeApi>) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(&*app) {
                tokio::task::yield_now().await;
                app.poll_background();
            }
        })
        .await
        .expect("condition reached in time");
    }

    fn loaded(app: &App<FakeApi>) -> bool {
        app.dashboard().is_some_and(|d| !d.is_loading())
    }

    #[tokio::test]
    async fn login_screen_hands_off_to_browser() {
        let api = Arc::new(FakeApi::default());
        let mut app = App::new(Arc::clone(&api), Route::Login);

        app.login();
        assert_eq!(api.login_calls.load(Ordering::SeqCst), 1);
        assert!(matches!(app.screen, Screen::Login));
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn filter_change_resets_selection_and_count() {
        let api = Arc::new(FakeApi::default().with_events(vec![Ok(vec![
            event(1, "Interview", None),
            event(2, "Exam", None),
            event(3, "Workshop", None),
        ])]));
        let mut app = App::new(api, Route::Dashboard);
        poll_until(&mut app, loaded).await;

        assert_eq!(app.card_list_state.len, 3);
        app.card_list_state.select_last();
        assert_eq!(app.card_list_state.selected, 2);

        app.set_filter(FilterCategory::Exam);
        assert_eq!(app.card_list_state.len, 1);
        assert_eq!(app.card_list_state.selected, 0);
        assert_eq!(app.selected_card().map(|c| c.company), Some("Company 2".into()));

        app.cycle_filter(true);
        assert_eq!(app.dashboard().map(|d| d.filter()), Some(FilterCategory::Other));
    }

    #[tokio::test]
    async fn logout_returns_to_login_even_on_failure() {
        let api = Arc::new(FakeApi::default().failing_logout());
        let mut app = App::new(Arc::clone(&api), Route::Dashboard);
        poll_until(&mut app, loaded).await;

        app.begin_logout();
        assert!(matches!(app.screen, Screen::SigningOut));
        poll_until(&mut app, |a| matches!(a.screen, Screen::Login)).await;
        assert_eq!(api.logout_calls.load(Ordering::SeqCst), 1);

        // Coming back mounts a fresh dashboard.
        app.navigate(Route::Dashboard);
        poll_until(&mut app, loaded).await;
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn greeting_updates_when_identity_arrives_late() {
        let api = Arc::new(
            FakeApi::default()
                .with_events(vec![Ok(vec![event(1, "Exam", None)])])
                .gate_user(),
        );
        *api.user.lock().expect("user lock") = Ok(crate::models::UserInfo {
            name: "Sam".into(),
            email: String::new(),
        });
        let mut app = App::new(Arc::clone(&api), Route::Dashboard);
        poll_until(&mut app, loaded).await;
        assert_eq!(app.status_message, "Welcome, User! 1 events loaded.");

        api.user_gate.notify_one();
        poll_until(&mut app, |a| a.dashboard().is_some_and(|d| d.user_info().name == "Sam")).await;
        assert_eq!(app.status_message, "Welcome, Sam! 1 events loaded.");
    }

    #[tokio::test]
    async fn sync_status_is_reported() {
        let api = Arc::new(FakeApi::default().with_events(vec![
            Ok(vec![]),
            Ok(vec![event(9, "Interview", None)]),
        ]));
        let mut app = App::new(Arc::clone(&api), Route::Dashboard);
        poll_until(&mut app, loaded).await;

        app.start_sync();
        assert_eq!(app.status_message, "Syncing emails...");
        poll_until(&mut app, |a| a.dashboard().is_some_and(|d| !d.is_syncing())).await;

        assert_eq!(app.status_message, "Sync finished. 1 events.");
        assert_eq!(app.card_list_state.len, 1);
    }

    #[test]
    fn list_state_clamps() {
        let mut state = ListState::new();
        state.select_next();
        assert_eq!(state.selected, 0);
        state.set_len(3);
        state.select_last();
        state.select_next();
        assert_eq!(state.selected, 2);
        state.set_len(1);
        assert_eq!(state.selected, 0);
        state.set_len(0);
        state.select_prev();
        assert_eq!(state.selected, 0);
    }
}
