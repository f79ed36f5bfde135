use analytics::{AnalysisOptions, ForecastSeries, PortfolioAnalysis, analyze, forecast, summarize_prices};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use configuration::settings::AnalysisSettings;
use configuration::{Config, Overrides, load_config};
use core_types::{PortfolioEntry, PriceWindow, Ticker};
use market_data::{CsvPriceSource, PriceSource};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod render;

/// The main entry point for the Folio portfolio analyzer.
fn main() -> Result<()> {
    // Load RUST_LOG and FOLIO_* variables from a .env file, if there is one.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config),
        Commands::Forecast(args) => handle_forecast(args, config),
        Commands::Prices(args) => handle_prices(args, config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Portfolio analytics: weights, risk and return statistics, and a value forecast.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to ./folio.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute weights, annualized statistics, correlation and a forecast.
    Analyze(AnalyzeArgs),
    /// Project portfolio value with monthly contributions.
    Forecast(ForecastArgs),
    /// Summarize the price history for the selected window.
    Prices(PricesArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// A holding as TICKER=WEIGHT (repeatable). Replaces the configured portfolio.
    #[arg(long = "holding", value_parser = parse_holding)]
    holdings: Vec<PortfolioEntry>,

    /// Print the covariance matrix as well.
    #[arg(long)]
    covariance: bool,

    /// Emit JSON instead of tables.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Parser)]
struct ForecastArgs {
    /// Annual growth rate as a decimal (0.07 = 7%). Without it, the portfolio's expected return is used.
    #[arg(long, allow_hyphen_values = true)]
    rate: Option<f64>,

    /// A holding as TICKER=WEIGHT (repeatable), used when no rate is given.
    #[arg(long = "holding", value_parser = parse_holding)]
    holdings: Vec<PortfolioEntry>,

    /// Emit JSON instead of tables.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Parser)]
struct PricesArgs {
    /// Only these tickers (repeatable). Defaults to every ticker in the file.
    #[arg(long = "ticker")]
    tickers: Vec<String>,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,
}

/// Parses `VTI=60` into a portfolio row. A bare `VTI` has no weight.
fn parse_holding(raw: &str) -> Result<PortfolioEntry, String> {
    match raw.split_once('=') {
        Some((ticker, weight)) => {
            let weight: f64 = weight
                .trim()
                .parse()
                .map_err(|_| format!("invalid weight in '{raw}', expected TICKER=NUMBER"))?;
            Ok(PortfolioEntry::new(ticker.trim(), weight))
        }
        None => Ok(PortfolioEntry {
            ticker: raw.trim().to_string(),
            weight_percent: None,
        }),
    }
}

fn analysis_options(settings: &AnalysisSettings) -> AnalysisOptions {
    AnalysisOptions {
        periods_per_year: settings.periods_per_year,
        policy: settings.annualization,
        window: settings.window,
        min_observations: settings.min_observations,
        duplicates: settings.duplicate_tickers,
    }
}

fn apply_overrides(mut config: Config, overrides: &Overrides) -> Result<Config> {
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Loads prices for the portfolio and runs the full analysis pipeline.
fn run_analysis(config: &Config, holdings: Vec<PortfolioEntry>) -> Result<PortfolioAnalysis> {
    let entries = if holdings.is_empty() { config.portfolio.clone() } else { holdings };
    if entries.is_empty() {
        bail!("No holdings given. Pass --holding TICKER=WEIGHT or add [[portfolio]] rows to the configuration.");
    }

    let tickers: Vec<Ticker> = entries
        .iter()
        .filter_map(|e| Ticker::parse(&e.ticker))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let path = &config.data.prices_path;
    let source = CsvPriceSource::from_path(path)
        .with_context(|| format!("Failed to read prices from {}", path.display()))?;

    // The full history is fetched so the pipeline can tell "no data" from "outside the window".
    let fetch = source.fetch(&tickers, PriceWindow::Max)?;

    let analysis = analyze(
        &entries,
        &fetch.table,
        &fetch.unavailable,
        &analysis_options(&config.analysis),
    )?;
    Ok(analysis)
}

fn run_forecast(config: &Config, annual_rate: f64) -> Result<ForecastSeries> {
    let settings = &config.forecast;
    let series = forecast(
        settings.starting_value,
        settings.monthly_contribution,
        annual_rate,
        settings.horizon_years,
    )?;
    Ok(series)
}

#[derive(Serialize)]
struct AnalyzeReport<'a> {
    analysis: &'a PortfolioAnalysis,
    forecast: Option<ForecastSeries>,
    /// Why the forecast could not be projected, when it could not.
    forecast_error: Option<String>,
}

impl<'a> AnalyzeReport<'a> {
    fn new(analysis: &'a PortfolioAnalysis, projection: Result<ForecastSeries>) -> Self {
        match projection {
            Ok(series) => Self {
                analysis,
                forecast: Some(series),
                forecast_error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Forecast could not be projected.");
                Self {
                    analysis,
                    forecast: None,
                    forecast_error: Some(format!("{e:#}")),
                }
            }
        }
    }
}

fn handle_analyze(args: AnalyzeArgs, config: Config) -> Result<()> {
    let config = apply_overrides(config, &args.overrides)?;
    let analysis = run_analysis(&config, args.holdings)?;

    let rate = config.forecast.annual_rate.unwrap_or(analysis.stats.expected_return);
    let projection = run_forecast(&config, rate).context("Failed to project forecast");
    let report = AnalyzeReport::new(&analysis, projection);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let options = &analysis.options;
    println!(
        "Window {} | {} observations | {} periods/year | {} annualization",
        options.window, analysis.stats.observations, options.periods_per_year, options.policy
    );
    println!("{}", render::holdings_table(&analysis));

    if !analysis.excluded.is_empty() {
        println!("\nExcluded tickers:");
        println!("{}", render::exclusions_table(&analysis.excluded));
    }
    if !analysis.dropped_dates.is_empty() {
        println!(
            "\n{} return date(s) dropped because a holding had no price.",
            analysis.dropped_dates.len()
        );
    }

    println!("\nCorrelation:");
    println!("{}", render::correlation_table(&analysis.stats.correlation));
    if args.covariance {
        println!("\nAnnualized covariance:");
        println!("{}", render::covariance_table(&analysis.stats.covariance));
    }

    println!("\nForecast:");
    match (&report.forecast, &report.forecast_error) {
        (Some(series), _) => {
            println!("{}", render::forecast_summary(series));
            println!("{}", render::forecast_table(series));
        }
        (None, Some(reason)) => println!("Unavailable: {reason}"),
        (None, None) => {}
    }
    Ok(())
}

fn handle_forecast(args: ForecastArgs, config: Config) -> Result<()> {
    let config = apply_overrides(config, &args.overrides)?;

    let rate = match args.rate.or(config.forecast.annual_rate) {
        Some(rate) => rate,
        None => {
            tracing::info!("No rate given; using the portfolio's expected return.");
            run_analysis(&config, args.holdings)?.stats.expected_return
        }
    };
    let series = run_forecast(&config, rate)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        println!("{}", render::forecast_summary(&series));
        println!("{}", render::forecast_table(&series));
    }
    Ok(())
}

fn handle_prices(args: PricesArgs, config: Config) -> Result<()> {
    let config = apply_overrides(config, &args.overrides)?;
    let path = &config.data.prices_path;
    let source = CsvPriceSource::from_path(path)
        .with_context(|| format!("Failed to read prices from {}", path.display()))?;

    let table = if args.tickers.is_empty() {
        source.table().trailing(config.analysis.window)
    } else {
        let tickers: Vec<Ticker> = args.tickers.iter().filter_map(|t| Ticker::parse(t)).collect();
        source.fetch(&tickers, config.analysis.window)?.table
    };
    let summaries = summarize_prices(&table);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("Window {}", config.analysis.window);
        println!("{}", render::prices_table(&summaries));
    }
    Ok(())
}
