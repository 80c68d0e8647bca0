//! # Market Overview
//!
//! Market-wide views for the dashboard: index levels, an index comparison
//! chart, sector performance, the day's movers, a sector heatmap and the
//! headline metrics of a single stock.
//!
//! The computations in `metrics` are pure functions over bars. `MarketOverview`
//! fetches the fixed universes from `universe` and feeds them through those
//! functions; a symbol whose fetch fails is simply left out.

pub mod error;
pub mod metrics;
pub mod service;
pub mod universe;

// --- Public API ---
pub use error::OverviewError;
pub use metrics::{
    format_market_cap, HeatmapCell, Mover, Movers, NormalizedPoint, PriceChange,
    SectorPerformance, StockMetrics,
};
pub use service::{ComparisonSeries, IndexSnapshot, MarketOverview};
