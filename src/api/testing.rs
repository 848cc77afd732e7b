//! In-memory stand-in for the server, shared by the controller and screen
//! tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use super::{ApiError, EventsApi};
use crate::models::{Event, EventId, UserInfo};

pub fn event(id: i64, event_type: &str, date: Option<&str>) -> Event {
    Event {
        id: EventId::Number(id),
        company_name: Some(format!("Company {id}")),
        event_type: Some(event_type.to_string()),
        event_date: date.map(str::to_string),
        sender_email: Some(format!("hr{id}@example.com")),
        action_link: None,
        reminded: None,
        created_at: None,
        message_id: None,
    }
}

fn failure(what: &str) -> ApiError {
    ApiError::Api {
        status: 503,
        message: format!("{what} unavailable"),
    }
}

/// Each `list_events` call pops the next queued response; an empty queue
/// answers with an empty list.
pub struct FakeApi {
    pub events: Mutex<VecDeque<Result<Vec<Event>, ()>>>,
    pub user: Mutex<Result<UserInfo, ()>>,
    pub sync_fails: bool,
    pub logout_fails: bool,
    /// Held calls wait for a `notify_one` when the matching flag is set.
    pub sync_gate: Notify,
    pub user_gate: Notify,
    hold_sync: bool,
    hold_user: bool,
    pub list_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub sync_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    log: Mutex<Vec<&'static str>>,
}

impl FakeApi {
    pub fn with_events(self, responses: Vec<Result<Vec<Event>, ()>>) -> Self {
        *self.events.lock().expect("events lock poisoned") = responses.into();
        self
    }

    pub fn failing_sync(mut self) -> Self {
        self.sync_fails = true;
        self
    }

    pub fn failing_logout(mut self) -> Self {
        self.logout_fails = true;
        self
    }

    pub fn gate_sync(mut self) -> Self {
        self.hold_sync = true;
        self
    }

    pub fn gate_user(mut self) -> Self {
        self.hold_user = true;
        self
    }

    /// Operation names in the order they were invoked.
    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().expect("log lock poisoned").clone()
    }

    fn record(&self, name: &'static str, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.log.lock().expect("log lock poisoned").push(name);
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            user: Mutex::new(Ok(UserInfo::default())),
            sync_fails: false,
            logout_fails: false,
            sync_gate: Notify::new(),
            user_gate: Notify::new(),
            hold_sync: false,
            hold_user: false,
            list_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            sync_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EventsApi for FakeApi {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        self.record("list_events", &self.list_calls);
        let next = self
            .events
            .lock()
            .expect("events lock poisoned")
            .pop_front()
            .unwrap_or(Ok(Vec::new()));
        next.map_err(|()| failure("events"))
    }

    async fn get_user_info(&self) -> Result<UserInfo, ApiError> {
        self.record("get_user_info", &self.user_calls);
        if self.hold_user {
            self.user_gate.notified().await;
        }
        self.user
            .lock()
            .expect("user lock poisoned")
            .clone()
            .map_err(|()| failure("identity"))
    }

    async fn trigger_sync(&self) -> Result<(), ApiError> {
        self.record("trigger_sync", &self.sync_calls);
        if self.hold_sync {
            self.sync_gate.notified().await;
        }
        if self.sync_fails {
            return Err(failure("sync"));
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout", &self.logout_calls);
        if self.logout_fails {
            return Err(failure("logout"));
        }
        Ok(())
    }

    fn initiate_google_login(&self) -> Result<(), ApiError> {
        self.record("initiate_google_login", &self.login_calls);
        Ok(())
    }
}
