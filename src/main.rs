use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};
use lobx_agg::{telemetry, AggregationError, Aggregator, AppConfig, FailurePolicy, PriceMethod, Quantity, Quote};
use rust_decimal::Decimal;

/// Price a BTC order against the combined Coinbase, Kraken and Gemini books.
#[derive(Debug, Parser)]
#[command(name = "lobx-agg", version)]
struct Cli {
    /// Order size in BTC. Prompts when omitted.
    #[arg(short, long)]
    quantity: Option<String>,

    /// Overrides the configured venue failure policy.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Overrides the configured pricing method.
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Print the full quote as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Strict,
    Resilient,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => FailurePolicy::Strict,
            PolicyArg::Resilient => FailurePolicy::Resilient,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    TouchedMean,
    Vwap,
}

impl From<MethodArg> for PriceMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::TouchedMean => PriceMethod::TouchedMean,
            MethodArg::Vwap => PriceMethod::Vwap,
        }
    }
}

fn read_answer(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

// Offer the default size first, then ask; one retry on a bad quantity.
fn prompt_quantity(default: Decimal) -> anyhow::Result<Quantity> {
    let answer = read_answer(&format!("Do you want {} BTC, Y or N? ", default))?;
    if answer.eq_ignore_ascii_case("y") {
        return Ok(Quantity::new(default)?);
    }

    let input = read_answer("Please enter the BTC quantity of your order: ")?;
    match Quantity::parse(&input) {
        Ok(quantity) => Ok(quantity),
        Err(AggregationError::InvalidQuantity { .. }) => {
            let retry = read_answer("Please choose a BTC quantity greater than 0: ")?;
            Ok(Quantity::parse(&retry)?)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_quote(quote: &Quote, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(quote)?);
        return Ok(());
    }

    println!("{{\"Ask\": {}, \"Bid\": {}}}", quote.ask, quote.bid);
    if quote.partial {
        for failure in &quote.failed_venues {
            eprintln!("warning: {} excluded: {}", failure.venue, failure.reason);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env
    telemetry::init_tracing("info");
    telemetry::init_metrics()?;

    let cli = Cli::parse();
    let mut cfg = AppConfig::load()?;
    if let Some(policy) = cli.policy {
        cfg.policy = policy.into();
    }
    if let Some(method) = cli.method {
        cfg.method = method.into();
    }

    let quantity = match cli.quantity.as_deref() {
        Some(q) => Quantity::parse(q)?,
        None => prompt_quantity(cfg.default_quantity)?,
    };

    let aggregator = Aggregator::from_config(&cfg)?;
    let quote = aggregator.aggregate(quantity).await?;
    print_quote(&quote, cli.json)
}
