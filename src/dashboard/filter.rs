use crate::models::{Event, EventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterCategory {
    #[default]
    All,
    Interview,
    Exam,
    Other,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 4] = [
        FilterCategory::All,
        FilterCategory::Interview,
        FilterCategory::Exam,
        FilterCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Interview => "Interview",
            Self::Exam => "Exam",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive; anything unrecognised means `All`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(Self::All)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn matches(self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Interview => event.kind() == EventKind::Interview,
            Self::Exam => event.kind() == EventKind::Exam,
            Self::Other => event.kind() == EventKind::Other,
        }
    }
}

/// Events in `category`, in server order.
pub fn filter(events: &[Event], category: FilterCategory) -> Vec<&Event> {
    events.iter().filter(|e| category.matches(e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventId;
    use proptest::prelude::*;

    fn event(id: i64, event_type: Option<&str>) -> Event {
        Event {
            id: EventId::Number(id),
            company_name: Some(format!("Company {id}")),
            event_type: event_type.map(str::to_string),
            event_date: None,
            sender_email: None,
            action_link: None,
            reminded: None,
            created_at: None,
            message_id: None,
        }
    }

    fn ids(events: &[&Event]) -> Vec<EventId> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn other_catches_unknown_types() {
        let events = vec![event(1, Some("Interview")), event(2, Some("Workshop"))];
        assert_eq!(ids(&filter(&events, FilterCategory::Other)), vec![EventId::Number(2)]);
        assert_eq!(ids(&filter(&events, FilterCategory::Interview)), vec![EventId::Number(1)]);
        assert!(filter(&events, FilterCategory::Exam).is_empty());
    }

    #[test]
    fn unknown_labels_mean_all() {
        assert_eq!(FilterCategory::from_label("exam"), FilterCategory::Exam);
        assert_eq!(FilterCategory::from_label(" Other "), FilterCategory::Other);
        assert_eq!(FilterCategory::from_label("Deadline"), FilterCategory::All);
        assert_eq!(FilterCategory::from_label(""), FilterCategory::All);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        assert_eq!(FilterCategory::Other.next(), FilterCategory::All);
        assert_eq!(FilterCategory::All.prev(), FilterCategory::Other);
        assert_eq!(FilterCategory::Interview.next(), FilterCategory::Exam);
    }

    fn event_type() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(Some("Interview".to_string())),
            Just(Some("Exam".to_string())),
            Just(None),
            "[A-Za-z ]{0,12}".prop_map(Some),
        ]
    }

    proptest! {
        #[test]
        fn categories_partition_the_list(types in prop::collection::vec(event_type(), 0..40)) {
            let events: Vec<Event> = types
                .iter()
                .enumerate()
                .map(|(i, t)| event(i as i64, t.as_deref()))
                .collect();

            let all = filter(&events, FilterCategory::All);
            prop_assert_eq!(all.len(), events.len());
            prop_assert!(all.iter().zip(events.iter()).all(|(a, b)| *a == b));

            let mut seen = 0;
            for e in &events {
                let hits = [FilterCategory::Interview, FilterCategory::Exam, FilterCategory::Other]
                    .into_iter()
                    .filter(|c| c.matches(e))
                    .count();
                prop_assert_eq!(hits, 1);
                seen += 1;
            }
            let total = filter(&events, FilterCategory::Interview).len()
                + filter(&events, FilterCategory::Exam).len()
                + filter(&events, FilterCategory::Other).len();
            prop_assert_eq!(total, seen);
        }
    }
}
