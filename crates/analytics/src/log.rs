use serde::{Deserialize, Serialize};

use crate::event::{AnalyticsEvent, Interaction, PageView, Visit};

/// The persisted analytics log: one event stream stored as three sequences.
///
/// A section missing from the file deserializes as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsLog {
    #[serde(default)]
    pub visits: Vec<Visit>,
    #[serde(default)]
    pub page_views: Vec<PageView>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

impl AnalyticsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` to the sequence for its variant.
    pub fn append(&mut self, event: AnalyticsEvent) {
        match event {
            AnalyticsEvent::Visit(v) => self.visits.push(v),
            AnalyticsEvent::PageView(p) => self.page_views.push(p),
            AnalyticsEvent::Interaction(i) => self.interactions.push(i),
        }
    }

    pub fn len(&self) -> usize {
        self.visits.len() + self.page_views.len() + self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All events as one stream ordered by timestamp.
    ///
    /// The sort is stable: events sharing a second keep visits first, then
    /// page views, then interactions, each in append order.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        let mut events: Vec<AnalyticsEvent> = self
            .visits
            .iter()
            .cloned()
            .map(AnalyticsEvent::from)
            .chain(self.page_views.iter().cloned().map(AnalyticsEvent::from))
            .chain(self.interactions.iter().cloned().map(AnalyticsEvent::from))
            .collect();
        events.sort_by_key(AnalyticsEvent::timestamp);
        events
    }
}
