use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamps are stored as local wall-clock time, `YYYY-MM-DD HH:MM:SS`,
/// with no timezone marker.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A value in an interaction's `details` map.
///
/// The key set is caller-defined per interaction type and is not validated.
/// Values outside the typed variants (null, nested objects, mixed lists) are
/// kept verbatim in `Other` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl DetailValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DetailValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            DetailValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::Text(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Number(value)
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        DetailValue::Flag(value)
    }
}

impl From<Vec<String>> for DetailValue {
    fn from(value: Vec<String>) -> Self {
        DetailValue::List(value)
    }
}

pub type Details = BTreeMap<String, DetailValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub user_id: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub user_id: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub page_name: String,
    /// The session's running count of views of this page, including this one.
    pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub interaction_type: String,
    #[serde(default, deserialize_with = "details_or_empty")]
    pub details: Details,
}

/// `"details": null` reads as an empty map.
fn details_or_empty<'de, D>(deserializer: D) -> Result<Details, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Details>::deserialize(deserializer)?.unwrap_or_default())
}

/// One recorded usage event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    Visit(Visit),
    PageView(PageView),
    Interaction(Interaction),
}

impl AnalyticsEvent {
    pub fn user_id(&self) -> &str {
        match self {
            AnalyticsEvent::Visit(v) => &v.user_id,
            AnalyticsEvent::PageView(p) => &p.user_id,
            AnalyticsEvent::Interaction(i) => &i.user_id,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            AnalyticsEvent::Visit(v) => v.timestamp,
            AnalyticsEvent::PageView(p) => p.timestamp,
            AnalyticsEvent::Interaction(i) => i.timestamp,
        }
    }
}

impl From<Visit> for AnalyticsEvent {
    fn from(value: Visit) -> Self {
        AnalyticsEvent::Visit(value)
    }
}

impl From<PageView> for AnalyticsEvent {
    fn from(value: PageView) -> Self {
        AnalyticsEvent::PageView(value)
    }
}

impl From<Interaction> for AnalyticsEvent {
    fn from(value: Interaction) -> Self {
        AnalyticsEvent::Interaction(value)
    }
}
