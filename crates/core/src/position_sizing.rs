use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::method::SizingMethod;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Inputs to the sizing formula other than the risk budget.
///
/// The numeric fields are optional; `None` and zero both mean "not provided".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionParameters {
    /// Average multiplier, either tracked from history or set by hand.
    pub avg_multiplier: Option<Decimal>,
    /// Take-profit as a percent move of the underlying (0.33 = 0.33%).
    pub take_profit: Option<Decimal>,
    /// Stop-loss as a percent move of the underlying.
    pub stop_loss: Option<Decimal>,
    /// Option premium per contract in dollars.
    pub premium: Option<Decimal>,
    /// Contracts per lot; may be fractional.
    pub lot_size: Option<Decimal>,
    pub method: SizingMethod,
}

/// The five required inputs once they are all present and non-zero.
#[derive(Debug, Clone, Copy)]
struct RequiredInputs {
    take_profit: Decimal,
    stop_loss: Decimal,
    premium: Decimal,
    lot_size: Decimal,
}

impl PositionParameters {
    fn required(&self) -> Option<RequiredInputs> {
        fn present(value: Option<Decimal>) -> Option<Decimal> {
            value.filter(|v| !v.is_zero())
        }

        present(self.avg_multiplier)?;
        Some(RequiredInputs {
            take_profit: present(self.take_profit)?,
            stop_loss: present(self.stop_loss)?,
            premium: present(self.premium)?,
            lot_size: present(self.lot_size)?,
        })
    }

    /// True when every input the formula needs is present and non-zero.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.required().is_some()
    }
}

/// Output of [`compute_position`]. All zero means "not enough information yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingResult {
    /// Option move in percent when the underlying hits take-profit.
    pub option_move_tp: Decimal,
    /// Option move in percent when the underlying hits stop-loss.
    pub option_move_sl: Decimal,
    /// Fractional lots; never rounded here.
    pub lots_to_buy: Decimal,
    pub total_premium: Decimal,
    pub potential_profit: Decimal,
    pub potential_loss: Decimal,
}

impl SizingResult {
    pub const ZERO: Self = Self {
        option_move_tp: Decimal::ZERO,
        option_move_sl: Decimal::ZERO,
        lots_to_buy: Decimal::ZERO,
        total_premium: Decimal::ZERO,
        potential_profit: Decimal::ZERO,
        potential_loss: Decimal::ZERO,
    };

    /// Whether the result recommends buying anything.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.lots_to_buy > Decimal::ZERO
    }
}

/// Sizes a position so that hitting the stop-loss loses exactly `risk_amount`.
///
/// # Formula
/// ```text
/// move_tp       = take_profit × m
/// move_sl       = stop_loss × m
/// loss_per_lot  = premium × lot_size × move_sl / 100
/// lots          = risk_amount / loss_per_lot
/// ```
///
/// Returns [`SizingResult::ZERO`] if any required parameter is missing or zero,
/// or if any step overflows `Decimal`. If the loss per lot is not positive the
/// TP/SL moves are still reported but every sizing output is zero.
///
/// # Examples
/// ```
/// use lot_sizer_core::{compute_position, PositionParameters, SizingMethod};
/// use rust_decimal_macros::dec;
///
/// let params = PositionParameters {
///     avg_multiplier: Some(dec!(65)),
///     take_profit: Some(dec!(0.33)),
///     stop_loss: Some(dec!(2)),
///     premium: Some(dec!(5)),
///     lot_size: Some(dec!(1)),
///     method: SizingMethod::Average,
/// };
/// let result = compute_position(&params, dec!(200), dec!(65));
///
/// assert_eq!(result.option_move_sl, dec!(130));
/// assert!((result.potential_loss - dec!(200)).abs() < dec!(0.0001));
/// ```
#[must_use]
pub fn compute_position(
    params: &PositionParameters,
    risk_amount: Decimal,
    effective_multiplier: Decimal,
) -> SizingResult {
    let Some(inputs) = params.required() else {
        return SizingResult::ZERO;
    };

    size(inputs, risk_amount, effective_multiplier).unwrap_or_else(|| {
        tracing::warn!(
            %risk_amount,
            %effective_multiplier,
            "Position size out of range, reporting zero result"
        );
        SizingResult::ZERO
    })
}

fn size(
    inputs: RequiredInputs,
    risk_amount: Decimal,
    effective_multiplier: Decimal,
) -> Option<SizingResult> {
    let option_move_tp = inputs.take_profit.checked_mul(effective_multiplier)?;
    let option_move_sl = inputs.stop_loss.checked_mul(effective_multiplier)?;

    let premium_per_lot = inputs.premium.checked_mul(inputs.lot_size)?;
    let loss_per_lot = premium_per_lot.checked_mul(option_move_sl.checked_div(HUNDRED)?)?;

    if loss_per_lot <= Decimal::ZERO {
        return Some(SizingResult {
            option_move_tp,
            option_move_sl,
            ..SizingResult::ZERO
        });
    }

    let lots_to_buy = risk_amount.checked_div(loss_per_lot)?;
    let total_premium = lots_to_buy.checked_mul(premium_per_lot)?;

    Some(SizingResult {
        option_move_tp,
        option_move_sl,
        lots_to_buy,
        total_premium,
        potential_profit: total_premium.checked_mul(option_move_tp.checked_div(HUNDRED)?)?,
        potential_loss: lots_to_buy.checked_mul(loss_per_lot)?,
    })
}

/// Option premium after the projected TP and SL moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumTargets {
    pub entry: Decimal,
    pub at_take_profit: Decimal,
    /// Can go negative when the SL move exceeds 100%; reported as computed.
    pub at_stop_loss: Decimal,
}

impl PremiumTargets {
    /// A target that overflows `Decimal` is reported as zero.
    #[must_use]
    pub fn new(premium: Option<Decimal>, result: &SizingResult) -> Self {
        let entry = premium.unwrap_or_default();
        let after = |factor: Option<Decimal>| {
            factor
                .and_then(|f| entry.checked_mul(f))
                .unwrap_or_default()
        };
        let tp_move = result.option_move_tp.checked_div(HUNDRED);
        let sl_move = result.option_move_sl.checked_div(HUNDRED);

        Self {
            entry,
            at_take_profit: after(tp_move.and_then(|m| Decimal::ONE.checked_add(m))),
            at_stop_loss: after(sl_move.and_then(|m| Decimal::ONE.checked_sub(m))),
        }
    }
}

/// Cost, risk and reward ratios of a sized position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub lots_to_buy: Decimal,
    pub lot_size: Decimal,
    /// `lots_to_buy × lot_size`
    pub total_contracts: Decimal,
    pub total_premium: Decimal,
    pub cost_pct_of_capital: Decimal,
    pub risk_pct_of_position: Decimal,
    pub reward_pct_of_position: Decimal,
}

impl PositionSummary {
    /// `None` unless the result actually buys something and every ratio fits
    /// in a `Decimal`.
    #[must_use]
    pub fn new(result: &SizingResult, capital: Decimal, lot_size: Decimal) -> Option<Self> {
        if !result.has_position() || result.total_premium.is_zero() {
            return None;
        }

        let pct = |part: Decimal, whole: Decimal| part.checked_div(whole)?.checked_mul(HUNDRED);
        let cost_pct_of_capital = if capital.is_zero() {
            Decimal::ZERO
        } else {
            pct(result.total_premium, capital)?
        };

        Some(Self {
            lots_to_buy: result.lots_to_buy,
            lot_size,
            total_contracts: result.lots_to_buy.checked_mul(lot_size)?,
            total_premium: result.total_premium,
            cost_pct_of_capital,
            risk_pct_of_position: pct(result.potential_loss, result.total_premium)?,
            reward_pct_of_position: pct(result.potential_profit, result.total_premium)?,
        })
    }
}
