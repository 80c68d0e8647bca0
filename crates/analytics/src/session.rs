use chrono::NaiveDateTime;
use std::collections::HashMap;
use uuid::Uuid;

use crate::event::Interaction;

/// Per-browser-session analytics state, owned by the caller.
///
/// The page-view counters live here rather than in the log: they restart at
/// zero for every new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    user_id: String,
    visit_timestamp: NaiveDateTime,
    page_views: HashMap<String, u64>,
    interactions: Vec<Interaction>,
}

impl SessionContext {
    /// A new session with a freshly generated user id.
    pub fn new(visit_timestamp: NaiveDateTime) -> Self {
        Self::with_user_id(Uuid::new_v4().to_string(), visit_timestamp)
    }

    pub fn with_user_id(user_id: impl Into<String>, visit_timestamp: NaiveDateTime) -> Self {
        Self {
            user_id: user_id.into(),
            visit_timestamp,
            page_views: HashMap::new(),
            interactions: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn visit_timestamp(&self) -> NaiveDateTime {
        self.visit_timestamp
    }

    /// Views of `page_name` recorded in this session so far.
    pub fn view_count(&self, page_name: &str) -> u64 {
        self.page_views.get(page_name).copied().unwrap_or(0)
    }

    /// Interactions recorded in this session, oldest first.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub(crate) fn increment_view(&mut self, page_name: &str) -> u64 {
        let count = self.page_views.entry(page_name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub(crate) fn push_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }
}
