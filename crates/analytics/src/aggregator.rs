use chrono::{Local, NaiveDate, NaiveDateTime};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::clock::{truncate_to_second, Clock, LocalClock};
use crate::error::AnalyticsError;
use crate::event::{AnalyticsEvent, Details, Interaction, PageView, Visit};
use crate::log::AnalyticsLog;
use crate::session::SessionContext;
use crate::store::LogStore;
use crate::summary::{summarize, AnalyticsSummary};

/// Records usage events into a [`LogStore`] and summarizes them on demand.
///
/// Each append re-reads the whole log, adds one event and writes the whole
/// log back. Appends from one aggregator are serialized; appends from
/// separate processes sharing a file are not, and the last writer wins.
pub struct AnalyticsAggregator {
    store: Box<dyn LogStore>,
    clock: Box<dyn Clock>,
    write_lock: Mutex<()>,
    last_stamp: Mutex<Option<NaiveDateTime>>,
}

impl AnalyticsAggregator {
    pub fn new(store: impl LogStore + 'static) -> Self {
        Self::with_clock(store, LocalClock)
    }

    pub fn with_clock(store: impl LogStore + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            store: Box::new(store),
            clock: Box::new(clock),
            write_lock: Mutex::new(()),
            last_stamp: Mutex::new(None),
        }
    }

    /// Opens a new session and records its visit.
    ///
    /// A failed write is logged and the session is still returned, so the
    /// caller's page keeps working.
    pub fn start_session(&self) -> SessionContext {
        let session = SessionContext::new(self.stamp());
        if let Err(e) = self.record_visit(&session) {
            tracing::warn!(user_id = session.user_id(), error = %e, "Failed to record visit.");
        }
        tracing::info!(user_id = session.user_id(), "Analytics session started.");
        session
    }

    /// Appends a visit for `session` with a freshly generated session id.
    ///
    /// The visit carries the session's visit timestamp, raised to the last
    /// stamp already handed out when the session is older than that.
    pub fn record_visit(&self, session: &SessionContext) -> Result<Visit, AnalyticsError> {
        let visit = Visit {
            user_id: session.user_id().to_string(),
            timestamp: self.clamp(session.visit_timestamp()),
            session_id: Uuid::new_v4().to_string(),
        };
        self.append(visit.clone().into())?;
        Ok(visit)
    }

    /// Bumps the session's counter for `page_name` and appends a page view
    /// carrying the new count.
    ///
    /// The counter advances even when the write fails.
    pub fn record_page_view(
        &self,
        session: &mut SessionContext,
        page_name: &str,
    ) -> Result<PageView, AnalyticsError> {
        let view_count = session.increment_view(page_name);
        let page_view = PageView {
            user_id: session.user_id().to_string(),
            timestamp: self.stamp(),
            page_name: page_name.to_string(),
            view_count,
        };
        self.append(page_view.clone().into())?;
        Ok(page_view)
    }

    /// Appends an interaction with caller-defined `details`.
    pub fn record_interaction(
        &self,
        session: &mut SessionContext,
        interaction_type: &str,
        details: Details,
    ) -> Result<Interaction, AnalyticsError> {
        let interaction = Interaction {
            user_id: session.user_id().to_string(),
            timestamp: self.stamp(),
            interaction_type: interaction_type.to_string(),
            details,
        };
        session.push_interaction(interaction.clone());
        self.append(interaction.clone().into())?;
        Ok(interaction)
    }

    /// Summarizes the full log as of today's local date.
    pub fn summarize(&self) -> AnalyticsSummary {
        self.summarize_as_of(Local::now().date_naive())
    }

    /// Summarizes the full log, counting `visits_today` against `today`.
    pub fn summarize_as_of(&self, today: NaiveDate) -> AnalyticsSummary {
        summarize(&self.store.load(), today)
    }

    /// The raw log as currently stored.
    pub fn load(&self) -> AnalyticsLog {
        self.store.load()
    }

    /// Replaces the log with an empty one. Irreversible.
    pub fn clear(&self) -> Result<(), AnalyticsError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.save(&AnalyticsLog::new())?;
        tracing::info!("Analytics log cleared.");
        Ok(())
    }

    fn append(&self, event: AnalyticsEvent) -> Result<(), AnalyticsError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut log = self.store.load();
        tracing::debug!(user_id = event.user_id(), existing = log.len(), "Appending analytics event.");
        log.append(event);
        self.store.save(&log)
    }

    /// The current time at second resolution, never earlier than the last
    /// stamp this aggregator handed out.
    fn stamp(&self) -> NaiveDateTime {
        self.clamp(self.clock.now())
    }

    fn clamp(&self, at: NaiveDateTime) -> NaiveDateTime {
        let now = truncate_to_second(at);
        let mut last = self.last_stamp.lock().unwrap_or_else(PoisonError::into_inner);
        let stamp = match *last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}
