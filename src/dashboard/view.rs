use crate::models::{Event, EventId, EventKind, UserInfo};

use super::date::format_date;
use super::filter::{filter, FilterCategory};
use super::Dashboard;
use crate::api::EventsApi;

pub const EMPTY_MESSAGE: &str = "No events found for this filter.";

/// Everything the screen needs for one event, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCard {
    pub id: EventId,
    pub kind: EventKind,
    /// The server's type string, shown on the badge even when it buckets
    /// into `Other`.
    pub type_label: String,
    pub company: String,
    pub date: String,
    pub date_time: String,
    pub is_urgent: bool,
    pub sender: Option<String>,
    pub action_link: Option<String>,
    pub created: Option<String>,
    pub reminded: bool,
}

impl EventCard {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            kind: event.kind(),
            type_label: event
                .event_type
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Other".into()),
            company: event
                .company_name
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "Unknown company".into()),
            date: format_date(event.event_date.as_deref(), false),
            date_time: format_date(event.event_date.as_deref(), true),
            is_urgent: event.is_urgent(),
            sender: event.sender_email.clone().filter(|s| !s.trim().is_empty()),
            action_link: event.action_link.clone().filter(|l| !l.trim().is_empty()),
            created: event
                .created_at
                .as_deref()
                .map(|raw| format_date(Some(raw), true)),
            reminded: event.reminded.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub loading: bool,
    pub syncing: bool,
    pub user: UserInfo,
    pub filter: FilterCategory,
    pub cards: Vec<EventCard>,
    pub total_events: usize,
    /// Set when the current filter leaves nothing to show.
    pub empty_message: Option<&'static str>,
}

impl<C: EventsApi + 'static> Dashboard<C> {
    pub fn view(&self) -> DashboardView {
        let cards: Vec<EventCard> = filter(self.events(), self.filter())
            .into_iter()
            .map(EventCard::from_event)
            .collect();

        DashboardView {
            loading: self.is_loading(),
            syncing: self.is_syncing(),
            user: self.user_info().clone(),
            filter: self.filter(),
            empty_message: cards.is_empty().then_some(EMPTY_MESSAGE),
            total_events: self.events().len(),
            cards,
        }
    }
}

impl DashboardView {
    /// Plain-text rendering for non-interactive output, one line per card.
    pub fn plain_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Logged in as {} | filter: {} | {} of {} events",
            self.user.name,
            self.filter.label(),
            self.cards.len(),
            self.total_events
        )];
        lines.extend(self.cards.iter().map(|card| {
            let mut line = format!(
                "{} {:<12} {:<14} {}",
                if card.is_urgent { "!" } else { " " },
                card.type_label,
                card.date,
                card.company
            );
            if let Some(sender) = &card.sender {
                line.push_str(&format!(" <{sender}>"));
            }
            if let Some(link) = &card.action_link {
                line.push_str(&format!(" {link}"));
            }
            line
        }));
        if let Some(msg) = self.empty_message {
            lines.push(msg.to_string());
        }
        lines
    }
}
