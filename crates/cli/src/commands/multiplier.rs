use anyhow::Result;
use clap::Args;
use lot_sizer_core::{MultiplierObservation, ReportFormatter};
use rust_decimal::Decimal;

/// Arguments for the multiplier command.
#[derive(Args, Debug, Clone)]
pub struct MultiplierArgs {
    /// Option price change in percent
    #[arg(allow_negative_numbers = true)]
    pub option_change: Decimal,

    /// Underlying price change in percent (non-zero)
    #[arg(allow_negative_numbers = true)]
    pub underlying_change: Decimal,
}

/// Prints the multiplier for a single pair of price changes.
///
/// # Errors
///
/// Returns an error if either change is zero.
pub fn run_multiplier(args: MultiplierArgs) -> Result<()> {
    let observation =
        MultiplierObservation::from_changes(Some(args.option_change), Some(args.underlying_change))?;
    print!("{}", ReportFormatter::format_observation(&observation));
    Ok(())
}
