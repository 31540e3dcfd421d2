//! Invest CLI - track holdings, inspect portfolio metrics and ask questions.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use invest_core::chat::format_irr;
use invest_core::config::DEFAULT_TICKERS;
use invest_core::metrics::portfolio_value_series;
use invest_core::render::percent;
use invest_core::{
    allocation, build_responder, irr, ApiResponse, Config, Holdings, HoldingsStore,
    MetricsReport, Period, PortfolioTools, PriceSource, PriceTable, QueryResponder, QueryRouter,
    Renderer, StubResponder, TextRenderer, YahooPriceSource,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "invest")]
#[command(about = "Personal investment tracker - holdings, portfolio metrics and chat")]
#[command(version)]
struct Cli {
    /// Holdings file (overrides INVEST_HOLDINGS_FILE)
    #[arg(long, global = true, value_name = "PATH")]
    holdings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the quantity held for a ticker
    Update {
        /// Stock symbol, e.g. AAPL
        ticker: String,
        /// Number of shares
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
    },
    /// Stop tracking a ticker
    Remove {
        /// Stock symbol
        ticker: String,
    },
    /// List current holdings
    Holdings,
    /// Total return, allocation and volatility contribution
    Metrics {
        /// Price lookback (1mo, 6mo, 1y, ytd, max, ...)
        #[arg(long)]
        period: Option<Period>,
        /// Rolling volatility window in trading days
        #[arg(long)]
        window: Option<usize>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chart portfolio value and allocation in the terminal
    Visualize {
        /// Price lookback (1mo, 6mo, 1y, ytd, max, ...)
        #[arg(long)]
        period: Option<Period>,
    },
    /// Ask a question about the portfolio
    Chat {
        /// Question text; negative numbers are taken literally
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Internal rate of return of periodic cash flows
    Irr {
        /// Cash flows in order, negative for money invested
        #[arg(required = true, num_args = 2.., allow_negative_numbers = true)]
        cash_flows: Vec<f64>,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(path) = cli.holdings {
        config.holdings_path = path;
    }
    let store = config.holdings_store();
    tracing::info!(holdings = %store.path().display(), "invest starting");

    match cli.command {
        Commands::Update { ticker, quantity } => {
            store.update(&ticker, quantity)?;
            println!("Updated {ticker}: {quantity}");
        }
        Commands::Remove { ticker } => match store.remove(&ticker)? {
            Some(quantity) => println!("Removed {ticker} ({quantity})"),
            None => println!("{ticker} is not held"),
        },
        Commands::Holdings => handle_holdings(&store)?,
        Commands::Metrics {
            period,
            window,
            json,
        } => {
            let period = period.unwrap_or(config.default_period);
            let window = window.unwrap_or(config.volatility_window);
            handle_metrics(&store, period, window, json)?;
        }
        Commands::Visualize { period } => {
            handle_visualize(&store, period.unwrap_or(config.default_period))?;
        }
        Commands::Chat { query } => {
            let router = QueryRouter::new(chat_responder(&config, store));
            println!("{}", router.route(&query.join(" ")));
        }
        Commands::Irr { cash_flows } => {
            let rate = irr(&cash_flows)?;
            println!("{}", format_irr(rate));
        }
    }

    Ok(())
}

fn handle_holdings(store: &HoldingsStore) -> Result<()> {
    let holdings = store.load()?;
    if holdings.is_empty() {
        println!(
            "No holdings yet. Add one with `invest update <TICKER> <QTY>` (e.g. {}).",
            DEFAULT_TICKERS.join(", ")
        );
        return Ok(());
    }

    let width = holdings.keys().map(String::len).max().unwrap_or(0);
    for (ticker, quantity) in &holdings {
        println!("{ticker:<width$}  {quantity}");
    }
    Ok(())
}

fn handle_metrics(store: &HoldingsStore, period: Period, window: usize, json: bool) -> Result<()> {
    let computed = load_portfolio(store, period).and_then(|(holdings, prices)| {
        let report = MetricsReport::compute(&prices, &holdings, window)?;
        Ok((holdings, report))
    });

    if json {
        let body = match &computed {
            Ok((_, report)) => serde_json::to_string_pretty(&ApiResponse::ok(report))?,
            Err(e) => serde_json::to_string_pretty(&ApiResponse::<()>::err(format!("{e:#}")))?,
        };
        println!("{body}");
    }
    let (holdings, report) = computed?;
    if json {
        return Ok(());
    }

    println!("Total return ({period}): {}", percent(report.total_return, 2));
    if let Some(as_of) = report.as_of {
        println!("As of: {as_of}");
    }

    let width = holdings.keys().map(String::len).max().unwrap_or(0);
    println!("\nAllocation:");
    for (ticker, weight) in &report.allocation {
        println!("  {ticker:<width$}  {:>8}", percent(*weight, 2));
    }
    println!("\nVolatility contribution ({}-day window):", report.window);
    for (ticker, share) in &report.volatility_contribution {
        println!("  {ticker:<width$}  {:>8}", percent(*share, 2));
    }
    Ok(())
}

fn handle_visualize(store: &HoldingsStore, period: Period) -> Result<()> {
    let (holdings, prices) = load_portfolio(store, period)?;
    let series = portfolio_value_series(&prices, &holdings)?;
    let weights = allocation(&prices, &holdings)?;

    let mut renderer = TextRenderer::stdout();
    renderer.line("Portfolio Value Over Time", &series)?;
    println!();
    renderer.pie("Asset Allocation", &weights)?;
    Ok(())
}

/// Holdings plus their price history from Yahoo Finance.
fn load_portfolio(store: &HoldingsStore, period: Period) -> Result<(Holdings, PriceTable)> {
    let holdings = store.load()?;
    if holdings.is_empty() {
        bail!("no holdings recorded; add one with `invest update <TICKER> <QTY>`");
    }

    let source = YahooPriceSource::new()?;
    let tickers: Vec<String> = holdings.keys().cloned().collect();
    let prices = source
        .fetch(&tickers, &period)
        .with_context(|| format!("Failed to fetch {period} prices from {}", source.name()))?;
    Ok((holdings, prices))
}

/// Configured responder, or the stub when it cannot be built.
fn chat_responder(config: &Config, store: HoldingsStore) -> Box<dyn QueryResponder> {
    let source = match YahooPriceSource::new() {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(error = %e, "price source unavailable, using stub responder");
            return Box::new(StubResponder);
        }
    };

    let tools = PortfolioTools::new(store, Arc::new(source));
    build_responder(&config.responder, tools).unwrap_or_else(|e| {
        tracing::warn!(
            responder = %config.responder.kind(),
            error = %e,
            "failed to build query responder, using stub"
        );
        Box::new(StubResponder)
    })
}
