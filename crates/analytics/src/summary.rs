use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::event::Interaction;
use crate::log::AnalyticsLog;

/// Interaction types counted as dashboard refreshes.
pub const UPDATE_INTERACTION_TYPES: [&str; 2] = ["dashboard_update", "dashboard_auto_refresh"];

/// A label with the number of times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyVisits {
    pub date: NaiveDate,
    pub visits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyUpdates {
    /// Start of the hour.
    pub hour: NaiveDateTime,
    pub update_type: String,
    pub count: usize,
}

/// Aggregated usage metrics computed from the full analytics log.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalyticsSummary {
    // I. Headline counts
    pub total_visits: usize,
    pub unique_users: usize,
    pub total_page_views: usize,
    pub total_interactions: usize,
    pub visits_today: usize,
    pub average_views_per_user: f64,

    // II. Distributions
    /// Ascending by date.
    pub visits_by_day: Vec<DailyVisits>,
    /// Descending by views.
    pub page_popularity: Vec<Tally>,
    /// Descending by count.
    pub interaction_types: Vec<Tally>,

    // III. Feature usage drawn from interaction details
    pub popular_stocks: Vec<Tally>,
    pub popular_periods: Vec<Tally>,
    pub fetches_by_ticker: Vec<Tally>,
    /// Ascending by hour, then update type.
    pub updates_by_hour: Vec<HourlyUpdates>,
}

/// Summarizes `log`. `today` is the local calendar day used for `visits_today`.
///
/// Pure: the log is only read.
pub fn summarize(log: &AnalyticsLog, today: NaiveDate) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary::default();
    headline_counts(log, today, &mut summary);
    distributions(log, &mut summary);
    feature_usage(&log.interactions, &mut summary);
    summary
}

fn headline_counts(log: &AnalyticsLog, today: NaiveDate, summary: &mut AnalyticsSummary) {
    summary.total_visits = log.visits.len();
    summary.unique_users = log
        .visits
        .iter()
        .map(|v| v.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    summary.total_page_views = log.page_views.len();
    summary.total_interactions = log.interactions.len();
    summary.visits_today = log
        .visits
        .iter()
        .filter(|v| v.timestamp.date() == today)
        .count();

    // Mean number of page views per user who viewed any page.
    let viewers = log
        .page_views
        .iter()
        .map(|p| p.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    if viewers > 0 {
        summary.average_views_per_user = log.page_views.len() as f64 / viewers as f64;
    }
}

fn distributions(log: &AnalyticsLog, summary: &mut AnalyticsSummary) {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for visit in &log.visits {
        *by_day.entry(visit.timestamp.date()).or_default() += 1;
    }
    summary.visits_by_day = by_day
        .into_iter()
        .map(|(date, visits)| DailyVisits { date, visits })
        .collect();

    summary.page_popularity = rank(log.page_views.iter().map(|p| p.page_name.as_str()));
    summary.interaction_types = rank(log.interactions.iter().map(|i| i.interaction_type.as_str()));
}

fn feature_usage(interactions: &[Interaction], summary: &mut AnalyticsSummary) {
    let of_type = |kind: &'static str| {
        interactions
            .iter()
            .filter(move |i| i.interaction_type == kind)
    };

    summary.popular_stocks = rank(
        of_type("stock_selection")
            .filter_map(|i| i.details.get("stocks").and_then(|v| v.as_list()))
            .flatten()
            .map(String::as_str),
    );
    summary.popular_periods = rank(
        of_type("time_period_change").filter_map(|i| i.details.get("period").and_then(|v| v.as_text())),
    );
    summary.fetches_by_ticker = rank(
        of_type("data_fetch").filter_map(|i| i.details.get("ticker").and_then(|v| v.as_text())),
    );

    let mut by_hour: BTreeMap<(NaiveDateTime, &str), usize> = BTreeMap::new();
    for interaction in interactions
        .iter()
        .filter(|i| UPDATE_INTERACTION_TYPES.contains(&i.interaction_type.as_str()))
    {
        let hour = floor_to_hour(interaction.timestamp);
        *by_hour.entry((hour, interaction.interaction_type.as_str())).or_default() += 1;
    }
    summary.updates_by_hour = by_hour
        .into_iter()
        .map(|((hour, update_type), count)| HourlyUpdates {
            hour,
            update_type: update_type.to_string(),
            count,
        })
        .collect();
}

/// Counts each label and orders by descending count, ties by label.
fn rank<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<Tally> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut tallies: Vec<Tally> = counts
        .into_iter()
        .map(|(label, count)| Tally {
            label: label.to_string(),
            count,
        })
        .collect();
    tallies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    tallies
}

fn floor_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), 0, 0)
        .unwrap_or(ts)
}
