use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverviewError {
    #[error("No price data available for '{0}'")]
    NoData(String),

    #[error("Could not fetch data for all indices; missing: {}", .0.join(", "))]
    IncompleteComparison(Vec<String>),
}
