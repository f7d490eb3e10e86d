//! Position sizing for leveraged option trades.
//!
//! Estimates an option's leverage against its underlying from observed price
//! changes, keeps a history of those multipliers and turns a risk budget into
//! a lot count with projected profit and loss at the TP/SL levels.

pub mod account;
pub mod calculator;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod method;
pub mod multiplier;
pub mod position_sizing;
pub mod report_formatter;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Average multiplier used before any observation exists and after a clear.
pub const DEFAULT_MULTIPLIER: Decimal = dec!(65);

pub use account::AccountState;
pub use calculator::{Calculator, CalculatorSnapshot, SharedCalculator};
pub use config::{AccountConfig, CalculatorConfig, PositionConfig};
pub use config_loader::ConfigLoader;
pub use error::SizerError;
pub use method::{compute_effective_multiplier, SizingMethod, CONSERVATIVE_FALLBACK_FACTOR};
pub use multiplier::{average_multiplier, max_multiplier, MultiplierObservation, MultiplierTracker};
pub use position_sizing::{
    compute_position, PositionParameters, PositionSummary, PremiumTargets, SizingResult,
};
pub use report_formatter::ReportFormatter;
