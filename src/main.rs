use aggregation::{aggregate_daily, normalize_ledger, trades_to_csv};
use analytics::{
    MetricsEngine, beta_alpha, daily_returns, dated_returns, rolling_sharpe, rolling_volatility,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Config;
use core_types::{BenchmarkRow, CurvePoint, DateWindow, NormalizedTrade, StrategyClass};
use curves::{build_drawdown_curves, build_equity_curves, downsample_indices};
use distribution::{analyze_returns, detect_episodes};
use indicatif::{ProgressBar, ProgressStyle};
use ranker::{RankRequest, SortDirection, SortKey, rank_strategies};
use rust_decimal::prelude::*;
use store::{CsvBenchmarkStore, CsvTradeLedger, SnapshotLoader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Vantage analytics application.
fn main() -> anyhow::Result<()> {
    // Initialize structured logging, filterable via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = configuration::load_config_from(&cli.config)?;
    let window = DateWindow::new(cli.from, cli.to)?;

    match cli.command {
        Commands::Report => handle_report(&config, window, cli.json),
        Commands::Curves(args) => handle_curves(&config, window, cli.json, args),
        Commands::Distribution => handle_distribution(&config, window, cli.json),
        Commands::Project(args) => handle_project(&config, window, cli.json, args),
        Commands::Rank(args) => handle_rank(&config, window, cli.json, args),
        Commands::ExportTrades(args) => handle_export_trades(&config, window, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Portfolio analytics over a closed-trade ledger and a benchmark series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    /// Start of the inclusive analysis window (format: YYYY-MM-DD).
    #[arg(long, global = true)]
    from: Option<NaiveDate>,

    /// End of the inclusive analysis window (format: YYYY-MM-DD).
    #[arg(long, global = true)]
    to: Option<NaiveDate>,

    /// Emit JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full performance-metric battery.
    Report,
    /// Build the aligned equity and drawdown curves.
    Curves(CurvesArgs),
    /// Analyze the daily-return distribution and major drawdowns.
    Distribution,
    /// Project the forward equity distribution via Monte Carlo.
    Project(ProjectArgs),
    /// Rank strategies by comparable summary metrics.
    Rank(RankArgs),
    /// Export the normalized trade list as CSV.
    ExportTrades(ExportArgs),
}

#[derive(Parser)]
struct CurvesArgs {
    /// Maximum number of points per curve; longer series are
    /// downsampled shape-preservingly.
    #[arg(long)]
    max_points: Option<usize>,
}

#[derive(Parser)]
struct ProjectArgs {
    /// Simulated horizon in calendar days.
    #[arg(long)]
    days: Option<usize>,

    /// Number of simulated paths.
    #[arg(long)]
    simulations: Option<usize>,

    /// Fixed RNG seed for a reproducible projection.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
struct RankArgs {
    /// Keep only strategies of this class.
    #[arg(long)]
    class: Option<StrategyClass>,

    /// Case-insensitive substring match on the strategy name.
    #[arg(long)]
    search: Option<String>,

    #[arg(long, value_enum, default_value = "total-pnl")]
    sort: SortKey,

    #[arg(long, value_enum, default_value = "descending")]
    direction: SortDirection,

    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long, default_value_t = 25)]
    page_size: usize,
}

#[derive(Parser)]
struct ExportArgs {
    /// Destination file; omit to print to stdout.
    #[arg(long)]
    output: Option<String>,
}

// ==============================================================================
// Shared pipeline steps
// ==============================================================================

/// Loads the snapshot and runs it through normalization, aggregation,
/// and the canonical curve builder. The raw benchmark closes ride
/// along for the market-sensitivity metrics.
fn load_pipeline(
    config: &Config,
    window: DateWindow,
) -> anyhow::Result<(Vec<NormalizedTrade>, Vec<BenchmarkRow>, Vec<CurvePoint>)> {
    let mut loader = SnapshotLoader::new(
        Box::new(CsvTradeLedger::new(&config.data.trades_file)),
        Box::new(CsvBenchmarkStore::new(&config.data.benchmark_file)),
        std::time::Duration::from_secs(config.data.cache_ttl_secs),
    );
    let snapshot = loader.load(&config.account.benchmark_symbol, window, None)?;

    let trades = normalize_ledger(&snapshot.trades);
    let buckets = aggregate_daily(&trades, &snapshot.benchmark, window);
    let curve = build_equity_curves(&buckets);
    info!(trades = trades.len(), points = curve.len(), "analytics pipeline ready");
    Ok((trades, snapshot.benchmark, curve))
}

/// Absolute account equity: configured balance plus the combined
/// cumulative PnL at each curve point.
fn equity_series(config: &Config, curve: &[CurvePoint]) -> Vec<(NaiveDate, f64)> {
    let balance = config.account.balance.to_f64().unwrap_or(0.0);
    curve
        .iter()
        .map(|p| (p.date, balance + p.combined.to_f64().unwrap_or(0.0)))
        .collect()
}

fn metrics_engine(config: &Config) -> MetricsEngine {
    MetricsEngine::new(config.analytics.trading_days_per_year, config.analytics.risk_free_rate)
}

// ==============================================================================
// Command handlers
// ==============================================================================

fn handle_report(config: &Config, window: DateWindow, json: bool) -> anyhow::Result<()> {
    let (trades, benchmark, curve) = load_pipeline(config, window)?;
    let equity = equity_series(config, &curve);
    let pnls: Vec<rust_decimal::Decimal> = trades.iter().map(|t| t.pnl).collect();

    let bundle = metrics_engine(config).calculate(&equity, &pnls, config.account.balance);

    // Market sensitivity from the dated return streams of the combined
    // equity and the raw benchmark closes.
    let strategy_returns = dated_returns(&equity);
    let benchmark_levels: Vec<(NaiveDate, f64)> = benchmark
        .iter()
        .map(|r| (r.date, r.close.to_f64().unwrap_or(0.0)))
        .collect();
    let benchmark_returns = dated_returns(&benchmark_levels);
    let sensitivity =
        beta_alpha(&strategy_returns, &benchmark_returns, config.analytics.trading_days_per_year);

    if json {
        let window = config.analytics.rolling_window;
        let days = config.analytics.trading_days_per_year;
        let daily_rf = config.analytics.risk_free_rate / f64::from(days);
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "metrics": bundle,
                "market_sensitivity": sensitivity,
                "rolling_volatility": rolling_volatility(&strategy_returns, window, days),
                "rolling_sharpe": rolling_sharpe(&strategy_returns, window, daily_rf, days),
            }))?
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["Metric", "Value"]);
    table.add_row(["Total return", &format!("{:.2}%", bundle.total_return * 100.0)]);
    table.add_row(["Annualized return", &format!("{:.2}%", bundle.annualized_return * 100.0)]);
    table.add_row(["Annualized volatility", &format!("{:.2}%", bundle.annualized_volatility * 100.0)]);
    table.add_row(["Sharpe", &format!("{:.3}", bundle.sharpe)]);
    table.add_row(["Sortino", &format!("{:.3}", bundle.sortino)]);
    table.add_row(["Calmar", &format!("{:.3}", bundle.calmar)]);
    table.add_row(["Max drawdown", &format!("{:.2}%", bundle.max_drawdown * 100.0)]);
    table.add_row(["Max drawdown ($)", &format!("{:.2}", bundle.max_drawdown_dollars)]);
    table.add_row(["Ulcer index", &format!("{:.3}", bundle.ulcer_index)]);
    table.add_row(["Recovery factor", &format!("{:.3}", bundle.recovery_factor)]);
    table.add_row(["Trades", &bundle.trades.total_trades.to_string()]);
    table.add_row(["Win rate", &format!("{:.1}%", bundle.trades.win_rate * 100.0)]);
    table.add_row(["Profit factor", &format!("{:.3}", bundle.trades.profit_factor)]);
    table.add_row(["Expectancy ($)", &format!("{:.2}", bundle.trades.expectancy)]);
    table.add_row(["Kelly", &format!("{:.1}%", bundle.kelly_pct)]);
    table.add_row([
        "Risk of ruin",
        &format!(
            "{:.4} (A={:.3}, U={:.1})",
            bundle.risk_of_ruin.probability,
            bundle.risk_of_ruin.advantage,
            bundle.risk_of_ruin.capital_units
        ),
    ]);
    table.add_row(["Positive months", &format!("{:.1}%", bundle.monthly_consistency_pct)]);
    table.add_row(["Positive quarters", &format!("{:.1}%", bundle.quarterly_consistency_pct)]);
    if let Some(s) = sensitivity {
        table.add_row(["Beta", &format!("{:.3}", s.beta)]);
        table.add_row(["Alpha (ann.)", &format!("{:.2}%", s.alpha * 100.0)]);
    }
    println!("{table}");
    Ok(())
}

fn handle_curves(
    config: &Config,
    window: DateWindow,
    json: bool,
    args: CurvesArgs,
) -> anyhow::Result<()> {
    let (_, _, curve) = load_pipeline(config, window)?;
    let max_points = args.max_points.unwrap_or(config.chart.max_points);

    // Drawdown is derived at full resolution; both curves are then
    // reduced over the same kept rows so the pairs stay aligned and no
    // running peak is lost to the reduction.
    let drawdown_full = build_drawdown_curves(&curve);
    let kept = downsample_indices(&curve, max_points);
    let equity: Vec<CurvePoint> = kept.iter().map(|&i| curve[i]).collect();
    let drawdown: Vec<_> = kept.iter().map(|&i| drawdown_full[i]).collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "equity": equity,
                "drawdown": drawdown,
            }))?
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["Date", "Combined", "Swing", "Intraday", "Benchmark", "Drawdown"]);
    for (point, dd) in equity.iter().zip(&drawdown) {
        table.add_row([
            point.date.to_string(),
            point.combined.to_string(),
            point.swing.to_string(),
            point.intraday.to_string(),
            point.benchmark.to_string(),
            dd.combined.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_distribution(config: &Config, window: DateWindow, json: bool) -> anyhow::Result<()> {
    let (_, _, curve) = load_pipeline(config, window)?;
    let equity = equity_series(config, &curve);
    let values: Vec<f64> = equity.iter().map(|&(_, v)| v).collect();

    let dist = analyze_returns(&daily_returns(&values), config.analytics.distribution_buckets);
    let episodes = detect_episodes(&equity, config.episodes.min_depth_pct);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "distribution": dist,
                "episodes": episodes,
            }))?
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["Statistic", "Value"]);
    table.add_row(["Observations", &dist.observations.to_string()]);
    table.add_row(["Mean", &format!("{:.4}%", dist.mean * 100.0)]);
    table.add_row(["Std dev", &format!("{:.4}%", dist.std_dev * 100.0)]);
    table.add_row(["Skewness", &format!("{:.3}", dist.skewness)]);
    table.add_row(["Excess kurtosis", &format!("{:.3}", dist.kurtosis)]);
    table.add_row(["Days > +1%", &format!("{:.1}%", dist.pct_gt_1pct)]);
    table.add_row(["Days < -1%", &format!("{:.1}%", dist.pct_lt_minus_1pct)]);
    table.add_row(["Best day", &format!("{:.2}%", dist.best_day * 100.0)]);
    table.add_row(["Worst day", &format!("{:.2}%", dist.worst_day * 100.0)]);
    println!("{table}");

    let mut table = Table::new();
    table.set_header(["Peak", "Trough", "Recovery", "Depth", "Days"]);
    for episode in &episodes {
        table.add_row([
            episode.start_date.to_string(),
            episode.trough_date.to_string(),
            episode
                .recovery_date
                .map_or_else(|| "open".to_string(), |d| d.to_string()),
            format!("{:.1}%", episode.depth_pct),
            episode.total_duration_days.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_project(
    config: &Config,
    window: DateWindow,
    json: bool,
    args: ProjectArgs,
) -> anyhow::Result<()> {
    let (_, _, curve) = load_pipeline(config, window)?;
    let equity = equity_series(config, &curve);

    let days = args.days.unwrap_or(config.monte_carlo.horizon_days);
    let simulations = args.simulations.unwrap_or(config.monte_carlo.simulations);
    let seed = args.seed.or(config.monte_carlo.seed);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Simulating {simulations} paths over {days} days..."));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let result = projector::project(&equity, days, simulations, seed)?;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let current = result.current_equity;
    let mut table = Table::new();
    table.set_header(["Band", "Final equity"]);
    table.add_row(["Current", &format!("{:.2}", current)]);
    table.add_row(["p10", &format!("{:.2}", result.p10.last().copied().unwrap_or(current))]);
    table.add_row(["p50", &format!("{:.2}", result.p50.last().copied().unwrap_or(current))]);
    table.add_row(["p90", &format!("{:.2}", result.p90.last().copied().unwrap_or(current))]);
    println!("{table}");
    Ok(())
}

fn handle_rank(
    config: &Config,
    window: DateWindow,
    json: bool,
    args: RankArgs,
) -> anyhow::Result<()> {
    let (trades, _, _) = load_pipeline(config, window)?;
    let request = RankRequest {
        class: args.class,
        search: args.search,
        sort_key: args.sort,
        direction: args.direction,
        page: args.page,
        page_size: args.page_size,
    };
    let response =
        rank_strategies(&trades, config.account.balance, &metrics_engine(config), &request);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header([
        "Strategy", "Class", "Trades", "PnL", "Return", "Win rate", "PF", "Max DD", "Sharpe",
    ]);
    for row in &response.rows {
        table.add_row([
            row.name.clone(),
            row.class.to_string(),
            row.trades.to_string(),
            row.total_pnl.to_string(),
            format!("{:.2}%", row.total_return_pct),
            format!("{:.1}%", row.win_rate * 100.0),
            format!("{:.2}", row.profit_factor),
            format!("{:.1}%", row.max_drawdown_pct),
            format!("{:.2}", row.sharpe_daily),
        ]);
    }
    println!("{table}");
    println!("{} of {} strategies shown", response.rows.len(), response.total);
    Ok(())
}

fn handle_export_trades(
    config: &Config,
    window: DateWindow,
    args: ExportArgs,
) -> anyhow::Result<()> {
    let (trades, _, _) = load_pipeline(config, window)?;
    let csv = trades_to_csv(&trades)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, csv)?;
            println!("Exported {} trades to {path}", trades.len());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
