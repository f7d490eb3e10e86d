#![allow(clippy::format_push_string)]

use rust_decimal::{Decimal, RoundingStrategy};

use crate::calculator::Calculator;
use crate::multiplier::MultiplierObservation;

const RULE_HEAVY: &str = "═══════════════════════════════════════════════════════════════\n";
const RULE_LIGHT: &str = "───────────────────────────────────────────────────────────────\n";

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(calc: &Calculator) -> String {
        let account = calc.account();
        let params = calc.params();
        let result = calc.result();
        let targets = calc.premium_targets();

        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE_HEAVY);
        output.push_str("                OPTIONS POSITION SIZE                          \n");
        output.push_str(RULE_HEAVY);
        output.push('\n');

        // Account
        output.push_str("Account\n");
        output.push_str(RULE_LIGHT);
        output.push_str(&format!("Total Capital:         ${}\n", fixed(account.capital(), 2)));
        output.push_str(&format!("Risk Per Trade:        {}%\n", fixed(account.risk_percent(), 2)));
        output.push_str(&format!("Risk Amount:           ${}\n", fixed(account.risk_amount(), 2)));
        output.push('\n');

        // Multiplier
        output.push_str("Multiplier\n");
        output.push_str(RULE_LIGHT);
        match calc.current_multiplier() {
            Some(m) if m > Decimal::ZERO => {
                output.push_str(&format!("Current Multiplier:    {}\n", fixed(m, 2)));
            }
            _ => output.push_str("Current Multiplier:\n"),
        }
        output.push_str(&format!(
            "Average Multiplier:    {}\n",
            optional(params.avg_multiplier)
        ));
        output.push_str(&format!("Sizing Method:         {}\n", params.method.label()));
        output.push_str(&format!(
            "Effective Multiplier:  {}\n",
            fixed(calc.effective_multiplier(), 2)
        ));
        output.push('\n');

        // Targets
        output.push_str("Option Moves\n");
        output.push_str(RULE_LIGHT);
        output.push_str(&format!(
            "At Take Profit:        +{}%   (premium ${} → ${})\n",
            fixed(result.option_move_tp, 2),
            fixed(targets.entry, 2),
            fixed(targets.at_take_profit, 2)
        ));
        output.push_str(&format!(
            "At Stop Loss:          -{}%   (premium ${} → ${})\n",
            fixed(result.option_move_sl, 2),
            fixed(targets.entry, 2),
            fixed(targets.at_stop_loss, 2)
        ));
        output.push('\n');

        // Position
        output.push_str("Position Size\n");
        output.push_str(RULE_LIGHT);
        output.push_str(&format!(
            "Lots to Buy:           {}   (lot size {})\n",
            fixed(result.lots_to_buy, 3),
            optional(params.lot_size)
        ));
        output.push_str(&format!("Total Premium:         ${}\n", fixed(result.total_premium, 2)));
        output.push_str(&format!(
            "Potential Profit:      +${}\n",
            fixed(result.potential_profit, 2)
        ));
        output.push_str(&format!(
            "Potential Loss:        -${}\n",
            fixed(result.potential_loss, 2)
        ));

        if let Some(summary) = calc.summary() {
            output.push('\n');
            output.push_str("Summary\n");
            output.push_str(RULE_LIGHT);
            output.push_str(&format!(
                "Buy {} lots (size {}) at ${}/contract\n",
                fixed(summary.lots_to_buy, 3),
                summary.lot_size.normalize(),
                fixed(targets.entry, 2)
            ));
            output.push_str(&format!(
                "Total contracts: {}\n",
                fixed(summary.total_contracts, 3)
            ));
            output.push_str(&format!(
                "Total cost:  ${} ({}% of capital)\n",
                fixed(summary.total_premium, 2),
                fixed(summary.cost_pct_of_capital, 2)
            ));
            output.push_str(&format!(
                "Risk:        ${} ({}% of position)\n",
                fixed(result.potential_loss, 2),
                fixed(summary.risk_pct_of_position, 2)
            ));
            output.push_str(&format!(
                "Reward:      ${} ({}% of position)\n",
                fixed(result.potential_profit, 2),
                fixed(summary.reward_pct_of_position, 2)
            ));
        }
        output.push('\n');

        // History
        output.push_str("Multiplier History\n");
        output.push_str(RULE_LIGHT);
        if calc.history().is_empty() {
            output.push_str("No multipliers calculated yet\n");
        } else {
            for observation in calc.tracker().newest_first() {
                output.push_str(&Self::format_observation(observation));
            }
        }

        output.push('\n');
        output.push_str(RULE_HEAVY);

        output
    }

    /// Two-line history entry, e.g. `Multiplier: 86.32x` then the changes.
    #[must_use]
    pub fn format_observation(observation: &MultiplierObservation) -> String {
        format!(
            "Multiplier: {}x\n  Option: {}% | Underlying: {}%\n",
            fixed(observation.multiplier, 2),
            signed(observation.option_change),
            signed(observation.underlying_change)
        )
    }
}

fn signed(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", fixed(value, 2))
    } else {
        fixed(value, 2)
    }
}

/// Rounds half away from zero, then pads to exactly `dp` places.
fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

fn optional(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.normalize().to_string())
}
