use chrono::{Duration, TimeZone, Utc};
use core_types::PriceBar;
use indicators::{atr, bollinger_bands, ema, rsi, sma, IndicatorEngine, IndicatorParams};

/// Deterministic pseudo-random walk, good enough to exercise every branch.
fn random_walk(len: usize, seed: u64) -> Vec<PriceBar> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f64) / (u32::MAX as f64)
    };
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let mut close = 100.0;
    (0..len)
        .map(|i| {
            let open = close;
            close = (close + (next() - 0.5) * 4.0).max(1.0);
            let high = open.max(close) + next() * 2.0;
            let low = (open.min(close) - next() * 2.0).max(0.0);
            let volume = (next() * 1_000_000.0) as u64;
            PriceBar::new(start + Duration::days(i as i64), open, high, low, close, volume)
        })
        .collect()
}

#[test]
fn windowed_indicators_are_unavailable_below_their_window() {
    let bars = random_walk(10, 7);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    assert!(sma(&closes, 20).iter().all(Option::is_none));
    let bands = bollinger_bands(&closes, 20, 2.0);
    assert!(bands.middle.iter().all(Option::is_none));
    assert!(bands.upper.iter().all(Option::is_none));
    assert!(rsi(&closes, 14).iter().all(Option::is_none));
    assert!(atr(&bars, 14).iter().all(Option::is_none));
}

#[test]
fn every_column_is_aligned_with_the_input() {
    let bars = random_walk(250, 11);
    let series = IndicatorEngine::default().compute(&bars);

    assert_eq!(series.len(), 250);
    for column in series.sma.values() {
        assert_eq!(column.len(), 250);
    }
    for column in [
        &series.ema_fast,
        &series.ema_slow,
        &series.macd.line,
        &series.macd.signal,
        &series.macd.histogram,
        &series.bollinger.upper,
        &series.bollinger.middle,
        &series.bollinger.lower,
        &series.rsi,
        &series.atr,
    ] {
        assert_eq!(column.len(), 250);
    }
    assert_eq!(series.obv.len(), 250);

    // Leading windows: SMA200 needs 199 prior bars, RSI needs 14 changes.
    let sma_200 = series.sma(200).unwrap();
    assert!(sma_200[..199].iter().all(Option::is_none));
    assert!(sma_200[199..].iter().all(Option::is_some));
    assert!(series.rsi[..14].iter().all(Option::is_none));
    assert!(series.atr[..13].iter().all(Option::is_none));
    assert!(series.atr[13].is_some());
}

#[test]
fn rsi_is_bounded_and_atr_non_negative() {
    for seed in [1, 2, 3, 42, 1234] {
        let bars = random_walk(300, seed);
        let series = IndicatorEngine::default().compute(&bars);
        for value in series.rsi.iter().flatten() {
            assert!((0.0..=100.0).contains(value), "rsi out of range: {value}");
        }
        for value in series.atr.iter().flatten() {
            assert!(*value >= 0.0, "negative atr: {value}");
        }
    }
}

#[test]
fn macd_matches_ema_difference() {
    let bars = random_walk(120, 5);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let series = IndicatorEngine::default().compute(&bars);
    let fast = ema(&closes, 12);
    let slow = ema(&closes, 26);

    for i in 0..closes.len() {
        let (Some(f), Some(s)) = (fast[i], slow[i]) else {
            continue;
        };
        assert!((series.macd.line[i].unwrap() - (f - s)).abs() < 1e-9);
        assert_eq!(series.ema_fast[i], fast[i]);
    }
}

#[test]
fn empty_series_yields_empty_columns() {
    let series = IndicatorEngine::default().compute(&[]);
    assert!(series.is_empty());
    assert!(series.rows().is_empty());
    assert!(series.latest().is_none());
    assert!(series.sma.values().all(Vec::is_empty));
    assert!(series.obv.is_empty());
}

#[test]
fn rows_expose_configured_sma_windows() {
    let params = IndicatorParams {
        sma_periods: vec![3],
        ..IndicatorParams::default()
    };
    let start = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
    let bars: Vec<PriceBar> = [10.0, 11.0, 12.0, 11.0, 10.0]
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(start + Duration::days(i as i64), c, c, c, c, 100))
        .collect();

    let series = IndicatorEngine::new(params).compute(&bars);
    let rows = series.rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].sma.get("sma_3"), Some(&None));
    assert_eq!(rows[2].sma.get("sma_3"), Some(&Some(11.0)));

    let latest = series.latest().unwrap();
    assert_eq!(latest.close, 10.0);
    assert_eq!(latest.sma.get("sma_3"), Some(&Some(11.0)));

    let json = serde_json::to_value(&rows[1]).unwrap();
    assert!(json.get("sma_3").unwrap().is_null());
    assert_eq!(json["obv"], 200);
}
