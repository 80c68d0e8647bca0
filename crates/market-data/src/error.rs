use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request to the market-data source failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The market-data source returned an error: {code}: {description}")]
    Source { code: String, description: String },

    #[error("Failed to deserialize the market-data response: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid data format from market-data source: {0}")]
    InvalidData(String),

    #[error("No data returned for symbol '{0}'")]
    NoData(String),
}
