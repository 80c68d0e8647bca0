use analytics::{
    AnalyticsAggregator, AnalyticsEvent, DetailValue, Details, JsonFileStore, LogStore, ManualClock,
    MemoryStore, SessionContext,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::Arc;

fn noon(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn file_aggregator(dir: &tempfile::TempDir, clock: Arc<ManualClock>) -> AnalyticsAggregator {
    AnalyticsAggregator::with_clock(JsonFileStore::new(dir.path().join("analytics_data.json")), clock)
}

#[test]
fn page_views_count_per_session() {
    let aggregator = AnalyticsAggregator::new(MemoryStore::new());
    let mut session = aggregator.start_session();

    let first = aggregator.record_page_view(&mut session, "Home").unwrap();
    let second = aggregator.record_page_view(&mut session, "Home").unwrap();
    let other = aggregator.record_page_view(&mut session, "Market").unwrap();
    assert_eq!((first.view_count, second.view_count), (1, 2));
    assert_eq!(other.view_count, 1);

    // A new session starts counting from scratch.
    let mut next = aggregator.start_session();
    assert_eq!(aggregator.record_page_view(&mut next, "Home").unwrap().view_count, 1);

    let counts: Vec<u64> = aggregator
        .load()
        .page_views
        .iter()
        .filter(|p| p.user_id == session.user_id() && p.page_name == "Home")
        .map(|p| p.view_count)
        .collect();
    assert_eq!(counts, [1, 2]);
}

#[test]
fn summary_counts_visits_and_unique_users() {
    let aggregator = AnalyticsAggregator::new(MemoryStore::new());
    let returning = SessionContext::with_user_id("returning-user", noon(1));
    for _ in 0..3 {
        aggregator.record_visit(&returning).unwrap();
    }
    aggregator.start_session();
    aggregator.start_session();

    let summary = aggregator.summarize();
    assert_eq!(summary.total_visits, 5);
    assert_eq!(summary.unique_users, 3);
}

#[test]
fn clear_then_summarize_reports_zero() {
    let dir = tempfile::tempdir().unwrap();
    let aggregator = file_aggregator(&dir, Arc::new(ManualClock::new(noon(3))));
    let mut session = aggregator.start_session();
    aggregator.record_page_view(&mut session, "Stocks").unwrap();
    aggregator
        .record_interaction(&mut session, "view_market_movers", Details::new())
        .unwrap();

    aggregator.clear().unwrap();
    let summary = aggregator.summarize_as_of(noon(3).date());
    assert_eq!(summary.total_visits, 0);
    assert_eq!(summary.unique_users, 0);
    assert_eq!(summary.total_page_views, 0);
    assert_eq!(summary.total_interactions, 0);
    assert_eq!(summary.visits_today, 0);
    assert!(summary.visits_by_day.is_empty());
    assert!(summary.page_popularity.is_empty());
    assert!(summary.interaction_types.is_empty());
}

#[test]
fn log_file_survives_a_new_aggregator() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(noon(4)));

    let mut details = Details::new();
    details.insert("ticker".into(), DetailValue::from("AAPL"));
    details.insert("period".into(), DetailValue::from("1mo"));

    let written = {
        let aggregator = file_aggregator(&dir, clock.clone());
        let mut session = aggregator.start_session();
        clock.advance(Duration::seconds(5));
        aggregator.record_page_view(&mut session, "Stocks").unwrap();
        aggregator
            .record_interaction(&mut session, "data_fetch", details.clone())
            .unwrap();
        assert_eq!(session.interactions().len(), 1);
        aggregator.load()
    };

    let reopened = file_aggregator(&dir, clock);
    let reloaded = reopened.load();
    assert_eq!(reloaded, written);
    assert_eq!(reloaded.interactions[0].details, details);
    assert_eq!(reopened.summarize_as_of(noon(4).date()).visits_today, 1);
}

#[test]
fn timestamps_never_go_backwards() {
    let clock = Arc::new(ManualClock::new(noon(5)));
    let aggregator = AnalyticsAggregator::with_clock(MemoryStore::new(), clock.clone());
    let mut session = aggregator.start_session();

    aggregator.record_page_view(&mut session, "Stocks").unwrap();
    clock.set(noon(5) - Duration::hours(1));
    let late = aggregator.record_page_view(&mut session, "Stocks").unwrap();
    assert_eq!(late.timestamp, noon(5));

    let events = aggregator.load().events();
    assert!(events.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    assert!(matches!(events[0], AnalyticsEvent::Visit(_)));
}

#[test]
fn stale_session_visit_is_raised_to_the_latest_stamp() {
    let clock = Arc::new(ManualClock::new(noon(8)));
    let aggregator = AnalyticsAggregator::with_clock(MemoryStore::new(), clock.clone());
    let stale = SessionContext::with_user_id("stale-user", noon(8) - Duration::days(1));

    let mut session = aggregator.start_session();
    aggregator.record_page_view(&mut session, "Stocks").unwrap();
    let visit = aggregator.record_visit(&stale).unwrap();
    assert_eq!(visit.timestamp, noon(8));

    let events = aggregator.load().events();
    assert!(events.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
}

#[test]
fn sub_second_precision_is_dropped() {
    let clock = Arc::new(ManualClock::new(noon(6) + Duration::milliseconds(750)));
    let aggregator = AnalyticsAggregator::with_clock(MemoryStore::new(), clock);
    let session = aggregator.start_session();
    assert_eq!(session.visit_timestamp(), noon(6));
}

#[test]
fn corrupt_file_is_replaced_on_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analytics_data.json");
    std::fs::write(&path, "[1, 2, 3").unwrap();

    let aggregator = file_aggregator(&dir, Arc::new(ManualClock::new(noon(7))));
    assert_eq!(aggregator.summarize().total_visits, 0);

    aggregator.start_session();
    let store = JsonFileStore::new(&path);
    assert_eq!(store.load().visits.len(), 1);
}

#[test]
fn legacy_log_with_free_form_details_survives_an_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analytics_data.json");
    std::fs::write(
        &path,
        r#"{
  "visits": [
    {"user_id": "a", "timestamp": "2024-09-01 10:00:00", "session_id": "s1"},
    {"user_id": "b", "timestamp": "2024-09-01 11:00:00", "session_id": "s2"}
  ],
  "page_views": [
    {"user_id": "a", "timestamp": "2024-09-01 10:00:05", "page_name": "Settings", "view_count": 1}
  ],
  "interactions": [
    {
      "user_id": "a",
      "timestamp": "2024-09-01 10:01:00",
      "interaction_type": "settings_updated",
      "details": {"settings": {"default_tickers": ["AAPL", "MSFT"], "auto_refresh": true, "refresh_interval": 60}}
    },
    {"user_id": "b", "timestamp": "2024-09-01 11:02:00", "interaction_type": "chart_toggle", "details": {"maybe": null}}
  ]
}"#,
    )
    .unwrap();

    let aggregator = file_aggregator(&dir, Arc::new(ManualClock::new(noon(2))));
    assert_eq!(aggregator.load().visits.len(), 2);

    aggregator.start_session();

    let log = JsonFileStore::new(&path).load();
    assert_eq!(log.visits.len(), 3);
    assert_eq!(log.page_views.len(), 1);
    assert_eq!(log.interactions.len(), 2);

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        raw["interactions"][0]["details"]["settings"]["default_tickers"],
        serde_json::json!(["AAPL", "MSFT"])
    );
    assert!(raw["interactions"][1]["details"]["maybe"].is_null());
}
