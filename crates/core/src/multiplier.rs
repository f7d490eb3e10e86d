//! Multiplier observations and their running history.
//!
//! A multiplier is the absolute ratio of an option's percentage price change to
//! the underlying's percentage change over the same interval. The tracker keeps
//! every accepted observation in arrival order and derives the statistics the
//! sizing methods select from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SizerError};

/// One accepted (option change, underlying change) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierObservation {
    /// Option price change in percent (signed).
    pub option_change: Decimal,
    /// Underlying price change in percent (signed, never zero).
    pub underlying_change: Decimal,
    /// `|option_change / underlying_change|`
    pub multiplier: Decimal,
}

impl MultiplierObservation {
    /// Builds an observation from a pair of percentage changes.
    ///
    /// A missing or zero value is treated as unset, for either input.
    ///
    /// # Errors
    /// Returns [`SizerError::InvalidInput`] if either change is unset or the
    /// ratio does not fit in a `Decimal`.
    pub fn from_changes(
        option_change: Option<Decimal>,
        underlying_change: Option<Decimal>,
    ) -> Result<Self> {
        let option_change = option_change
            .filter(|c| !c.is_zero())
            .ok_or_else(|| SizerError::InvalidInput("option change is required".to_string()))?;
        let underlying_change = underlying_change.filter(|c| !c.is_zero()).ok_or_else(|| {
            SizerError::InvalidInput("underlying change must be non-zero".to_string())
        })?;

        let multiplier = option_change
            .checked_div(underlying_change)
            .ok_or_else(|| {
                SizerError::InvalidInput(format!(
                    "multiplier {option_change} / {underlying_change} is out of range"
                ))
            })?
            .abs();

        Ok(Self {
            option_change,
            underlying_change,
            multiplier,
        })
    }
}

/// Arithmetic mean of the multipliers.
///
/// `None` for an empty history or when the sum overflows.
#[must_use]
pub fn average_multiplier(history: &[MultiplierObservation]) -> Option<Decimal> {
    if history.is_empty() {
        return None;
    }
    let sum = history
        .iter()
        .try_fold(Decimal::ZERO, |acc, o| acc.checked_add(o.multiplier))?;
    sum.checked_div(Decimal::from(history.len() as u64))
}

/// Largest observed multiplier, `None` for an empty history.
#[must_use]
pub fn max_multiplier(history: &[MultiplierObservation]) -> Option<Decimal> {
    history.iter().map(|o| o.multiplier).max()
}

/// Append-only history of multiplier observations with a running average.
#[derive(Debug, Clone)]
pub struct MultiplierTracker {
    history: Vec<MultiplierObservation>,
    average: Decimal,
    default_average: Decimal,
}

impl MultiplierTracker {
    /// Creates an empty tracker whose average starts at `default_average`.
    #[must_use]
    pub const fn new(default_average: Decimal) -> Self {
        Self {
            history: Vec::new(),
            average: default_average,
            default_average,
        }
    }

    /// Validates and records an observation, then recomputes the average from
    /// the whole history.
    ///
    /// # Errors
    /// Returns [`SizerError::InvalidInput`] when either change is missing or
    /// zero, or when the new average would overflow. The history and average
    /// are left untouched in that case.
    pub fn record_observation(
        &mut self,
        option_change: Option<Decimal>,
        underlying_change: Option<Decimal>,
    ) -> Result<MultiplierObservation> {
        let observation = MultiplierObservation::from_changes(option_change, underlying_change)
            .inspect_err(|e| {
                tracing::warn!(?option_change, ?underlying_change, "Rejected observation: {}", e);
            })?;

        self.history.push(observation);
        let Some(average) = average_multiplier(&self.history) else {
            self.history.pop();
            tracing::warn!(
                multiplier = %observation.multiplier,
                samples = self.history.len(),
                "Rejected observation: average out of range"
            );
            return Err(SizerError::InvalidInput(
                "average multiplier is out of range".to_string(),
            ));
        };
        self.average = average;

        tracing::debug!(
            multiplier = %observation.multiplier,
            average = %self.average,
            samples = self.history.len(),
            "Recorded multiplier observation"
        );

        Ok(observation)
    }

    /// Drops every observation and resets the average to the default.
    ///
    /// Callers are expected to have confirmed this with the user first.
    pub fn clear_history(&mut self) {
        let dropped = self.history.len();
        self.history.clear();
        self.average = self.default_average;
        tracing::info!(dropped, "Cleared multiplier history");
    }

    /// Observations in arrival order.
    #[must_use]
    pub fn history(&self) -> &[MultiplierObservation] {
        &self.history
    }

    /// Observations newest first, the order used for display.
    pub fn newest_first(&self) -> impl Iterator<Item = &MultiplierObservation> {
        self.history.iter().rev()
    }

    /// Mean multiplier over the history, or the default when it is empty.
    #[must_use]
    pub const fn average(&self) -> Decimal {
        self.average
    }

    #[must_use]
    pub const fn default_average(&self) -> Decimal {
        self.default_average
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for MultiplierTracker {
    fn default() -> Self {
        Self::new(crate::DEFAULT_MULTIPLIER)
    }
}
