use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::method::SizingMethod;

/// Starting values for a calculator session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub account: AccountConfig,
    pub position: PositionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub capital: Decimal,
    pub risk_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// Average multiplier used until history exists, and after it is cleared.
    pub default_multiplier: Decimal,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub premium: Decimal,
    pub lot_size: Decimal,
    pub method: SizingMethod,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            capital: dec!(10000),
            risk_percent: dec!(2),
        }
    }
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            default_multiplier: crate::DEFAULT_MULTIPLIER,
            take_profit: dec!(0.33),
            stop_loss: dec!(2),
            premium: dec!(5),
            lot_size: dec!(1),
            method: SizingMethod::Average,
        }
    }
}
