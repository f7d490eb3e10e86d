use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::multiplier::{max_multiplier, MultiplierObservation};

/// Worst-case scale applied to the average when `Conservative` has no history.
pub const CONSERVATIVE_FALLBACK_FACTOR: Decimal = dec!(1.3);

/// How the effective multiplier is chosen from the tracked statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMethod {
    /// Use the tracked (or manually set) average multiplier.
    #[default]
    Average,
    /// Use the largest multiplier ever observed, sizing smaller positions.
    Conservative,
    /// Alias of `Average`. No separate risk-parity formula is defined.
    RiskParity,
}

impl SizingMethod {
    /// Every method, in the order front ends list them.
    pub const ALL: [Self; 3] = [Self::Average, Self::Conservative, Self::RiskParity];

    /// Selects the multiplier used for sizing.
    ///
    /// The conservative fallback saturates at `Decimal::MAX`.
    #[must_use]
    pub fn effective_multiplier(
        self,
        avg_multiplier: Decimal,
        history: &[MultiplierObservation],
    ) -> Decimal {
        match self {
            Self::Average => avg_multiplier,
            Self::Conservative => max_multiplier(history).unwrap_or_else(|| {
                avg_multiplier
                    .checked_mul(CONSERVATIVE_FALLBACK_FACTOR)
                    .unwrap_or(Decimal::MAX)
            }),
            Self::RiskParity => Self::Average.effective_multiplier(avg_multiplier, history),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Conservative => "conservative",
            Self::RiskParity => "riskparity",
        }
    }

    /// Human-readable label shown by front ends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Average => "Average Multiplier",
            Self::Conservative => "Conservative (Higher Risk)",
            Self::RiskParity => "Risk Parity (Simple)",
        }
    }
}

impl fmt::Display for SizingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "average" => Ok(Self::Average),
            "conservative" => Ok(Self::Conservative),
            "riskparity" => Ok(Self::RiskParity),
            other => Err(format!(
                "unknown sizing method '{other}' (expected average, conservative or riskparity)"
            )),
        }
    }
}

/// Effective multiplier for `method` given the average and the history.
#[must_use]
pub fn compute_effective_multiplier(
    method: SizingMethod,
    avg_multiplier: Decimal,
    history: &[MultiplierObservation],
) -> Decimal {
    method.effective_multiplier(avg_multiplier, history)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(multipliers: &[Decimal]) -> Vec<MultiplierObservation> {
        multipliers
            .iter()
            .map(|&m| MultiplierObservation {
                option_change: m,
                underlying_change: dec!(1),
                multiplier: m,
            })
            .collect()
    }

    #[test]
    fn fallback_factor_is_one_point_three() {
        assert_eq!(CONSERVATIVE_FALLBACK_FACTOR, dec!(1.3));
    }

    #[test]
    fn average_returns_avg_unchanged() {
        let h = history(&[dec!(1), dec!(5)]);
        assert_eq!(compute_effective_multiplier(SizingMethod::Average, dec!(42), &h), dec!(42));
    }

    #[test]
    fn conservative_uses_history_max() {
        let h = history(&[dec!(1), dec!(5), dec!(3)]);
        assert_eq!(
            compute_effective_multiplier(SizingMethod::Conservative, dec!(3), &h),
            dec!(5)
        );
    }

    #[test]
    fn conservative_without_history_scales_average() {
        assert_eq!(
            compute_effective_multiplier(SizingMethod::Conservative, dec!(65), &[]),
            dec!(84.5)
        );
    }

    #[test]
    fn conservative_fallback_saturates() {
        assert_eq!(
            compute_effective_multiplier(SizingMethod::Conservative, Decimal::MAX, &[]),
            Decimal::MAX
        );
    }

    #[test]
    fn riskparity_matches_average() {
        let h = history(&[dec!(10), dec!(90)]);
        for avg in [dec!(0), dec!(65), dec!(12.5)] {
            assert_eq!(
                compute_effective_multiplier(SizingMethod::RiskParity, avg, &h),
                compute_effective_multiplier(SizingMethod::Average, avg, &h)
            );
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("average".parse::<SizingMethod>().unwrap(), SizingMethod::Average);
        assert_eq!("Conservative".parse::<SizingMethod>().unwrap(), SizingMethod::Conservative);
        assert_eq!(" RISKPARITY ".parse::<SizingMethod>().unwrap(), SizingMethod::RiskParity);
        assert!("kelly".parse::<SizingMethod>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for method in SizingMethod::ALL {
            assert_eq!(method.to_string().parse::<SizingMethod>().unwrap(), method);
        }
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&SizingMethod::RiskParity).unwrap();
        assert_eq!(json, "\"riskparity\"");
    }
}
