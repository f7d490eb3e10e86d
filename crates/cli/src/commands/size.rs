//! Size command.
//!
//! Builds a calculator from config, applies command-line overrides, replays
//! the given observations in order and prints the resulting position.

use anyhow::{Context, Result};
use clap::Args;
use lot_sizer_core::{Calculator, CalculatorConfig, ConfigLoader, ReportFormatter, SizingMethod};
use rust_decimal::Decimal;

/// Arguments for the size command.
#[derive(Args, Debug, Clone, Default)]
pub struct SizeArgs {
    /// Config file path (defaults to config/Config.toml when present)
    #[arg(short, long, env = "LOT_SIZER_CONFIG")]
    pub config: Option<String>,

    /// Total capital in dollars
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Risk per trade in percent of capital
    #[arg(long)]
    pub risk_percent: Option<Decimal>,

    /// Manual average multiplier (replaced by history when observations are given)
    #[arg(long)]
    pub avg_multiplier: Option<Decimal>,

    /// Take profit as a percent move of the underlying
    #[arg(long)]
    pub take_profit: Option<Decimal>,

    /// Stop loss as a percent move of the underlying
    #[arg(long)]
    pub stop_loss: Option<Decimal>,

    /// Option premium per contract in dollars
    #[arg(long)]
    pub premium: Option<Decimal>,

    /// Contracts per lot (may be fractional, e.g. 0.15)
    #[arg(long)]
    pub lot_size: Option<Decimal>,

    /// Sizing method: average, conservative or riskparity
    #[arg(short, long)]
    pub method: Option<SizingMethod>,

    /// Observed price changes as OPTION:UNDERLYING percent, e.g. 101:1.17 (repeatable)
    #[arg(short, long = "observation", value_parser = parse_observation, allow_hyphen_values = true)]
    pub observations: Vec<(Decimal, Decimal)>,

    /// Print JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

/// Parses `OPTION:UNDERLYING`, e.g. `-16.39:-0.23`.
pub fn parse_observation(s: &str) -> Result<(Decimal, Decimal), String> {
    let (option, underlying) = s
        .split_once(':')
        .ok_or_else(|| format!("expected OPTION:UNDERLYING, got '{s}'"))?;

    let option = option
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid option change '{option}': {e}"))?;
    let underlying = underlying
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid underlying change '{underlying}': {e}"))?;

    Ok((option, underlying))
}

fn load_config(path: Option<&str>) -> Result<CalculatorConfig> {
    match path {
        Some(path) => {
            ConfigLoader::load_from(path).with_context(|| format!("failed to load config {path}"))
        }
        None => ConfigLoader::load().context("failed to load config"),
    }
}

/// Builds the calculator described by `args` on top of `config`.
///
/// # Errors
///
/// Returns an error if any observation is rejected.
pub fn build_calculator(args: &SizeArgs, config: &CalculatorConfig) -> Result<Calculator> {
    let mut calc = Calculator::new(config);

    if let Some(capital) = args.capital {
        calc.set_capital(capital);
    }
    if let Some(risk_percent) = args.risk_percent {
        calc.set_risk_percent(risk_percent);
    }
    if let Some(avg) = args.avg_multiplier {
        calc.set_avg_multiplier(Some(avg));
    }
    if let Some(tp) = args.take_profit {
        calc.set_take_profit(Some(tp));
    }
    if let Some(sl) = args.stop_loss {
        calc.set_stop_loss(Some(sl));
    }
    if let Some(premium) = args.premium {
        calc.set_premium(Some(premium));
    }
    if let Some(lot_size) = args.lot_size {
        calc.set_lot_size(Some(lot_size));
    }
    if let Some(method) = args.method {
        calc.set_method(method);
    }

    for (i, &(option, underlying)) in args.observations.iter().enumerate() {
        calc.record_observation(Some(option), Some(underlying))
            .with_context(|| format!("observation #{} ({option}:{underlying})", i + 1))?;
    }

    Ok(calc)
}

/// Runs the size command.
///
/// # Errors
///
/// Returns an error if config loading fails, an observation is invalid or
/// JSON serialization fails.
pub fn run_size(args: SizeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let calc = build_calculator(&args, &config)?;

    tracing::info!(
        method = %calc.params().method,
        observations = calc.history().len(),
        lots = %calc.result().lots_to_buy,
        "Position sized"
    );

    if args.json {
        let output = serde_json::json!({
            "snapshot": calc.snapshot(),
            "premium_targets": calc.premium_targets(),
            "summary": calc.summary(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", ReportFormatter::format(&calc));
    }

    Ok(())
}
