use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading capital and the share of it risked per trade.
///
/// `risk_amount` is derived and kept in sync by every setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    capital: Decimal,
    risk_percent: Decimal,
    risk_amount: Decimal,
}

impl AccountState {
    #[must_use]
    pub fn new(capital: Decimal, risk_percent: Decimal) -> Self {
        Self {
            capital,
            risk_percent,
            risk_amount: risk_amount(capital, risk_percent),
        }
    }

    pub fn set_capital(&mut self, capital: Decimal) {
        self.capital = capital;
        self.risk_amount = risk_amount(self.capital, self.risk_percent);
    }

    pub fn set_risk_percent(&mut self, risk_percent: Decimal) {
        self.risk_percent = risk_percent;
        self.risk_amount = risk_amount(self.capital, self.risk_percent);
    }

    #[must_use]
    pub const fn capital(&self) -> Decimal {
        self.capital
    }

    #[must_use]
    pub const fn risk_percent(&self) -> Decimal {
        self.risk_percent
    }

    /// Dollars lost if the stop-loss is hit.
    #[must_use]
    pub const fn risk_amount(&self) -> Decimal {
        self.risk_amount
    }
}

/// `capital × risk_percent / 100`, or zero when the product overflows.
#[must_use]
pub fn risk_amount(capital: Decimal, risk_percent: Decimal) -> Decimal {
    capital
        .checked_mul(risk_percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| {
            tracing::warn!(%capital, %risk_percent, "Risk amount out of range, using zero");
            Decimal::ZERO
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn risk_amount_is_percent_of_capital() {
        let account = AccountState::new(dec!(10000), dec!(2));
        assert_eq!(account.risk_amount(), dec!(200));
    }

    #[test]
    fn setters_keep_risk_amount_in_sync() {
        let mut account = AccountState::new(dec!(10000), dec!(2));

        account.set_capital(dec!(25000));
        assert_eq!(account.risk_amount(), dec!(500));

        account.set_risk_percent(dec!(0.5));
        assert_eq!(account.risk_amount(), dec!(125));
    }

    #[test]
    fn overflowing_risk_amount_is_zero() {
        assert_eq!(risk_amount(Decimal::MAX, dec!(200)), dec!(0));
    }
}
