//! # Usage Analytics
//!
//! Durable recording of dashboard usage events and on-demand summaries.
//!
//! ## Architectural Principles
//!
//! - **Store is the source of truth:** every append and every summary re-reads
//!   the full log from its [`LogStore`]; nothing authoritative is cached.
//! - **Caller-owned sessions:** per-session state (user id, page-view
//!   counters) lives in a [`SessionContext`] the caller holds and passes in.
//! - **Recoverable corruption:** a missing or unparsable log loads as empty.
//!
//! ## Public API
//!
//! - `AnalyticsAggregator`: records visits, page views and interactions; summarizes; clears.
//! - `AnalyticsSummary`: the aggregated metrics.
//! - `JsonFileStore` / `MemoryStore`: log storage backends.
//! - `AnalyticsError`: write-side failures.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod clock;
pub mod error;
pub mod event;
pub mod log;
pub mod session;
pub mod store;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::AnalyticsAggregator;
pub use clock::{Clock, LocalClock, ManualClock};
pub use error::AnalyticsError;
pub use event::{AnalyticsEvent, DetailValue, Details, Interaction, PageView, Visit, TIMESTAMP_FORMAT};
pub use log::AnalyticsLog;
pub use session::SessionContext;
pub use store::{JsonFileStore, LogStore, MemoryStore};
pub use summary::{AnalyticsSummary, DailyVisits, HourlyUpdates, Tally};
