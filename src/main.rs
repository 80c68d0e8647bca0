use analytics::{AnalyticsAggregator, AnalyticsSummary, JsonFileStore, Tally};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::settings::{Config, LoggingSettings};
use configuration::ConfigArgs;
use core_types::{Interval, Period};
use indicators::{IndicatorEngine, IndicatorParams, IndicatorRow};
use market_data::{fetch_bars_or_empty, fetch_profile_or_default, MarketDataSource, YahooFinanceClient};
use market_overview::MarketOverview;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The main entry point for the MarketDeck dashboard backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config_from(&cli.config.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.config.display()))?;
    let _log_guard = init_tracing(&config.logging)?;
    tracing::debug!(path = %cli.config.config.display(), "Configuration loaded.");

    match cli.command {
        Commands::Serve => web_server::run_server(config).await,
        Commands::Indicators(args) => handle_indicators(args, &config).await,
        Commands::Market => handle_market(&config).await,
        Commands::Analytics { command } => handle_analytics(command, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Stock and market dashboard backend: indicators, market overview and usage analytics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSON API server.
    Serve,
    /// Fetch a symbol's history and print its technical indicators.
    Indicators(IndicatorArgs),
    /// Print index levels, sector performance and the day's movers.
    Market,
    /// Inspect or reset the usage analytics log.
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommand,
    },
}

#[derive(Parser)]
struct IndicatorArgs {
    /// The ticker symbol (e.g., "AAPL").
    symbol: String,

    /// History window (e.g., "1mo", "6mo", "1y"). Defaults to the configured period.
    #[arg(long)]
    period: Option<Period>,

    /// Bar spacing (e.g., "1d", "1h"). Defaults to the configured interval.
    #[arg(long)]
    interval: Option<Interval>,

    /// Number of most recent rows to print.
    #[arg(long, default_value_t = 10)]
    rows: usize,
}

#[derive(Subcommand)]
enum AnalyticsCommand {
    /// Print the usage summary.
    Summary {
        /// Emit the summary as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },
    /// Permanently delete every recorded event.
    Clear {
        /// Confirm the irreversible deletion.
        #[arg(long)]
        yes: bool,
    },
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs console logging plus an optional daily-rolling log file.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// must live until exit so buffered file output is flushed.
fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid log level '{}'", settings.level))?,
    };

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "marketdeck.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(guard)
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn market_source(config: &Config) -> anyhow::Result<Arc<dyn MarketDataSource>> {
    let client = YahooFinanceClient::new(&config.market_data)
        .context("Failed to build the market-data HTTP client")?;
    Ok(Arc::new(client))
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

async fn handle_indicators(args: IndicatorArgs, config: &Config) -> anyhow::Result<()> {
    let period = args.period.unwrap_or(config.dashboard.default_period);
    let interval = args.interval.unwrap_or(config.dashboard.default_interval);
    let source = market_source(config)?;

    let bars = fetch_bars_or_empty(source.as_ref(), &args.symbol, period, interval).await;
    if bars.is_empty() {
        bail!("No data found for {}", args.symbol);
    }
    let profile = fetch_profile_or_default(source.as_ref(), &args.symbol).await;

    let engine = IndicatorEngine::new(IndicatorParams::from(&config.indicators));
    let series = engine.compute(&bars);
    let rows = series.rows();
    let shown = &rows[rows.len().saturating_sub(args.rows)..];

    let name = profile.display_name.as_deref().unwrap_or(&args.symbol);
    println!("{name} ({}) | period {period} | interval {interval}", args.symbol);
    println!("{}", indicator_table(shown, &engine.params().sma_periods));
    Ok(())
}

fn indicator_table(rows: &[IndicatorRow], sma_periods: &[usize]) -> Table {
    let mut header = vec!["Time".to_string(), "Close".to_string()];
    header.extend(sma_periods.iter().map(|p| format!("SMA {p}")));
    header.extend(
        ["EMA fast", "EMA slow", "MACD", "Signal", "Hist", "BB upper", "BB lower", "RSI", "ATR", "OBV"]
            .map(String::from),
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for row in rows {
        let mut cells = vec![
            row.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            format!("{:.2}", row.close),
        ];
        cells.extend(
            sma_periods
                .iter()
                .map(|p| fmt_opt(row.sma.get(&format!("sma_{p}")).copied().flatten())),
        );
        cells.extend([
            fmt_opt(row.ema_fast),
            fmt_opt(row.ema_slow),
            fmt_opt(row.macd),
            fmt_opt(row.macd_signal),
            fmt_opt(row.macd_hist),
            fmt_opt(row.bb_upper),
            fmt_opt(row.bb_lower),
            fmt_opt(row.rsi),
            fmt_opt(row.atr),
            row.obv.to_string(),
        ]);
        table.add_row(cells);
    }
    table
}

async fn handle_market(config: &Config) -> anyhow::Result<()> {
    let overview = MarketOverview::new(market_source(config)?, config.indicators.rsi_period);

    let mut indices = Table::new();
    indices.load_preset(UTF8_FULL).set_header(vec!["Index", "Last", "Change", "Change %"]);
    for snapshot in overview.indices().await {
        let (last, change, pct) = match snapshot.change {
            Some(c) => (
                format!("{:.2}", c.latest),
                format!("{:+.2}", c.change),
                format!("{:+.2}%", c.change_pct),
            ),
            None => ("N/A".to_string(), "N/A".to_string(), "N/A".to_string()),
        };
        indices.add_row(vec![snapshot.name, last, change, pct]);
    }
    println!("Major Indices\n{indices}");

    let sectors = overview.sector_performance().await;
    if sectors.is_empty() {
        println!("Could not fetch sector performance data");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Sector", "ETF", "Price", "5-Day %"]);
        for s in sectors {
            table.add_row(vec![
                s.sector,
                s.etf,
                format!("{:.2}", s.price),
                format!("{:+.2}%", s.change_pct),
            ]);
        }
        println!("Sector Performance\n{table}");
    }

    let movers = overview.movers().await;
    for (title, side) in [("Top Gainers", movers.gainers), ("Top Losers", movers.losers)] {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Symbol", "Price", "Change %"]);
        for m in side {
            table.add_row(vec![
                m.symbol,
                format!("${:.2}", m.price),
                format!("{:+.2}%", m.change_pct),
            ]);
        }
        println!("{title}\n{table}");
    }
    Ok(())
}

fn handle_analytics(command: AnalyticsCommand, config: &Config) -> anyhow::Result<()> {
    let aggregator = AnalyticsAggregator::new(JsonFileStore::new(config.analytics.log_path.clone()));
    match command {
        AnalyticsCommand::Summary { json } => {
            let summary = aggregator.summarize();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        AnalyticsCommand::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear the analytics log without --yes");
            }
            aggregator.clear().context("Failed to clear the analytics log")?;
            println!("Analytics data cleared.");
        }
    }
    Ok(())
}

fn print_summary(summary: &AnalyticsSummary) {
    let mut headline = Table::new();
    headline.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    headline.add_row(vec!["Total visits".to_string(), summary.total_visits.to_string()]);
    headline.add_row(vec!["Unique users".to_string(), summary.unique_users.to_string()]);
    headline.add_row(vec!["Visits today".to_string(), summary.visits_today.to_string()]);
    headline.add_row(vec!["Page views".to_string(), summary.total_page_views.to_string()]);
    headline.add_row(vec![
        "Avg. views per user".to_string(),
        format!("{:.1}", summary.average_views_per_user),
    ]);
    headline.add_row(vec!["Interactions".to_string(), summary.total_interactions.to_string()]);
    println!("{headline}");

    if summary.total_visits == 0 {
        println!("No analytics data available yet.");
        return;
    }

    let mut days = Table::new();
    days.load_preset(UTF8_FULL).set_header(vec!["Date", "Visits"]);
    for day in &summary.visits_by_day {
        days.add_row(vec![day.date.to_string(), day.visits.to_string()]);
    }
    println!("Daily Visits\n{days}");

    for (title, tallies) in [
        ("Page Popularity", &summary.page_popularity),
        ("Interaction Types", &summary.interaction_types),
        ("Most Viewed Stocks", &summary.popular_stocks),
        ("Time Period Selections", &summary.popular_periods),
        ("Data Fetches by Ticker", &summary.fetches_by_ticker),
    ] {
        if !tallies.is_empty() {
            println!("{title}\n{}", tally_table(tallies));
        }
    }

    if !summary.updates_by_hour.is_empty() {
        let mut updates = Table::new();
        updates.load_preset(UTF8_FULL).set_header(vec!["Hour", "Type", "Count"]);
        for bucket in &summary.updates_by_hour {
            updates.add_row(vec![
                bucket.hour.format("%Y-%m-%d %H:00").to_string(),
                bucket.update_type.clone(),
                bucket.count.to_string(),
            ]);
        }
        println!("Dashboard Updates\n{updates}");
    }
}

fn tally_table(tallies: &[Tally]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Name", "Count"]);
    for tally in tallies {
        table.add_row(vec![tally.label.clone(), tally.count.to_string()]);
    }
    table
}
