//! Recompute-on-write calculator session.
//!
//! [`Calculator`] owns the account, the position parameters and the multiplier
//! history. Every mutator re-derives the risk amount and the sizing result
//! before returning, so any read after a write sees consistent values.
//! [`SharedCalculator`] serializes access for multi-threaded callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::account::AccountState;
use crate::config::CalculatorConfig;
use crate::error::Result;
use crate::method::SizingMethod;
use crate::multiplier::{MultiplierObservation, MultiplierTracker};
use crate::position_sizing::{
    compute_position, PositionParameters, PositionSummary, PremiumTargets, SizingResult,
};

#[derive(Debug, Clone)]
pub struct Calculator {
    account: AccountState,
    params: PositionParameters,
    tracker: MultiplierTracker,
    current_multiplier: Option<Decimal>,
    result: SizingResult,
}

impl Calculator {
    #[must_use]
    pub fn new(config: &CalculatorConfig) -> Self {
        let position = &config.position;
        let mut calculator = Self {
            account: AccountState::new(config.account.capital, config.account.risk_percent),
            params: PositionParameters {
                avg_multiplier: Some(position.default_multiplier),
                take_profit: Some(position.take_profit),
                stop_loss: Some(position.stop_loss),
                premium: Some(position.premium),
                lot_size: Some(position.lot_size),
                method: position.method,
            },
            tracker: MultiplierTracker::new(position.default_multiplier),
            current_multiplier: None,
            result: SizingResult::ZERO,
        };
        calculator.recompute();
        calculator
    }

    // ============================================
    // Account
    // ============================================

    pub fn set_capital(&mut self, capital: Decimal) {
        self.account.set_capital(capital);
        self.recompute();
    }

    pub fn set_risk_percent(&mut self, risk_percent: Decimal) {
        self.account.set_risk_percent(risk_percent);
        self.recompute();
    }

    // ============================================
    // Position parameters
    // ============================================

    /// Manual override; replaced again by the next recorded observation.
    pub fn set_avg_multiplier(&mut self, value: Option<Decimal>) {
        self.params.avg_multiplier = value;
        self.recompute();
    }

    pub fn set_take_profit(&mut self, value: Option<Decimal>) {
        self.params.take_profit = value;
        self.recompute();
    }

    pub fn set_stop_loss(&mut self, value: Option<Decimal>) {
        self.params.stop_loss = value;
        self.recompute();
    }

    pub fn set_premium(&mut self, value: Option<Decimal>) {
        self.params.premium = value;
        self.recompute();
    }

    pub fn set_lot_size(&mut self, value: Option<Decimal>) {
        self.params.lot_size = value;
        self.recompute();
    }

    pub fn set_method(&mut self, method: SizingMethod) {
        self.params.method = method;
        self.recompute();
    }

    // ============================================
    // History
    // ============================================

    /// Records an observation and makes the history average the new
    /// `avg_multiplier`.
    ///
    /// # Errors
    /// Returns [`SizerError::InvalidInput`](crate::SizerError::InvalidInput)
    /// for a missing or zero change; nothing is modified in that case.
    pub fn record_observation(
        &mut self,
        option_change: Option<Decimal>,
        underlying_change: Option<Decimal>,
    ) -> Result<MultiplierObservation> {
        let observation = self
            .tracker
            .record_observation(option_change, underlying_change)?;

        self.current_multiplier = Some(observation.multiplier);
        self.params.avg_multiplier = Some(self.tracker.average());
        self.recompute();

        Ok(observation)
    }

    /// Empties the history and restores the default average multiplier.
    ///
    /// Destructive; the caller must have confirmed it with the user.
    pub fn clear_history(&mut self) {
        self.tracker.clear_history();
        self.params.avg_multiplier = Some(self.tracker.default_average());
        self.recompute();
    }

    // ============================================
    // Reads
    // ============================================

    #[must_use]
    pub const fn account(&self) -> &AccountState {
        &self.account
    }

    #[must_use]
    pub const fn params(&self) -> &PositionParameters {
        &self.params
    }

    #[must_use]
    pub fn history(&self) -> &[MultiplierObservation] {
        self.tracker.history()
    }

    #[must_use]
    pub const fn tracker(&self) -> &MultiplierTracker {
        &self.tracker
    }

    /// Multiplier of the most recent observation, if any was recorded.
    #[must_use]
    pub const fn current_multiplier(&self) -> Option<Decimal> {
        self.current_multiplier
    }

    /// Multiplier the active method would size with right now.
    #[must_use]
    pub fn effective_multiplier(&self) -> Decimal {
        self.params.method.effective_multiplier(
            self.params.avg_multiplier.unwrap_or_default(),
            self.tracker.history(),
        )
    }

    #[must_use]
    pub const fn result(&self) -> &SizingResult {
        &self.result
    }

    #[must_use]
    pub fn premium_targets(&self) -> PremiumTargets {
        PremiumTargets::new(self.params.premium, &self.result)
    }

    #[must_use]
    pub fn summary(&self) -> Option<PositionSummary> {
        PositionSummary::new(
            &self.result,
            self.account.capital(),
            self.params.lot_size.unwrap_or_default(),
        )
    }

    #[must_use]
    pub fn snapshot(&self) -> CalculatorSnapshot {
        CalculatorSnapshot {
            account: self.account,
            params: self.params.clone(),
            history: self.tracker.history().to_vec(),
            current_multiplier: self.current_multiplier,
            effective_multiplier: self.effective_multiplier(),
            result: self.result,
        }
    }

    fn recompute(&mut self) {
        let multiplier = self.effective_multiplier();
        self.result = compute_position(&self.params, self.account.risk_amount(), multiplier);
        tracing::debug!(
            method = %self.params.method,
            multiplier = %multiplier,
            risk_amount = %self.account.risk_amount(),
            lots = %self.result.lots_to_buy,
            "Recomputed position"
        );
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(&CalculatorConfig::default())
    }
}

/// Consistent copy of a calculator's state taken under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorSnapshot {
    pub account: AccountState,
    pub params: PositionParameters,
    pub history: Vec<MultiplierObservation>,
    pub current_multiplier: Option<Decimal>,
    pub effective_multiplier: Decimal,
    pub result: SizingResult,
}

/// Thread-safe handle around one [`Calculator`].
#[derive(Debug, Clone, Default)]
pub struct SharedCalculator {
    inner: Arc<Mutex<Calculator>>,
}

impl SharedCalculator {
    #[must_use]
    pub fn new(calculator: Calculator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(calculator)),
        }
    }

    /// Runs `f` with exclusive access; the result is recomputed before the
    /// lock is released because every mutator recomputes.
    pub fn update<T>(&self, f: impl FnOnce(&mut Calculator) -> T) -> T {
        f(&mut *self.lock())
    }

    #[must_use]
    pub fn snapshot(&self) -> CalculatorSnapshot {
        self.lock().snapshot()
    }

    // Each mutator leaves the calculator consistent, so a poisoned lock still
    // guards valid state.
    fn lock(&self) -> MutexGuard<'_, Calculator> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SizerError;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.001)
    }

    #[test]
    fn defaults_produce_reference_sizing() {
        let calc = Calculator::default();

        assert_eq!(calc.account().risk_amount(), dec!(200));
        assert_eq!(calc.effective_multiplier(), dec!(65));
        assert!(close(calc.result().lots_to_buy, dec!(30.769)));
        assert!(close(calc.result().potential_loss, dec!(200)));
        assert_eq!(calc.current_multiplier(), None);
    }

    #[test]
    fn capital_change_resizes_immediately() {
        let mut calc = Calculator::default();
        calc.set_capital(dec!(20000));

        assert_eq!(calc.account().risk_amount(), dec!(400));
        assert!(close(calc.result().potential_loss, dec!(400)));
        assert!(close(calc.result().lots_to_buy, dec!(61.538)));
    }

    #[test]
    fn risk_percent_change_resizes_immediately() {
        let mut calc = Calculator::default();
        calc.set_risk_percent(dec!(1));
        assert!(close(calc.result().potential_loss, dec!(100)));
    }

    #[test]
    fn parameter_setters_recompute() {
        let mut calc = Calculator::default();

        calc.set_stop_loss(Some(dec!(1)));
        assert_eq!(calc.result().option_move_sl, dec!(65));

        calc.set_premium(None);
        assert_eq!(*calc.result(), SizingResult::ZERO);

        calc.set_premium(Some(dec!(5)));
        calc.set_lot_size(Some(dec!(0)));
        assert_eq!(*calc.result(), SizingResult::ZERO);

        calc.set_lot_size(Some(dec!(1)));
        calc.set_take_profit(Some(dec!(1)));
        assert_eq!(calc.result().option_move_tp, dec!(65));
    }

    #[test]
    fn record_overwrites_average_and_current_multiplier() {
        let mut calc = Calculator::default();
        calc.set_avg_multiplier(Some(dec!(80)));

        let obs = calc.record_observation(Some(dec!(101)), Some(dec!(1.01))).unwrap();
        assert_eq!(obs.multiplier, dec!(100));
        assert_eq!(calc.current_multiplier(), Some(dec!(100)));
        assert_eq!(calc.params().avg_multiplier, Some(dec!(100)));

        calc.record_observation(Some(dec!(-50)), Some(dec!(-1))).unwrap();
        assert_eq!(calc.current_multiplier(), Some(dec!(50)));
        assert_eq!(calc.params().avg_multiplier, Some(dec!(75)));
        assert_eq!(calc.result().option_move_sl, dec!(150));
    }

    #[test]
    fn invalid_record_changes_nothing() {
        let mut calc = Calculator::default();
        calc.record_observation(Some(dec!(40)), Some(dec!(1))).unwrap();
        let before = calc.snapshot();

        let err = calc.record_observation(Some(dec!(40)), Some(dec!(0))).unwrap_err();
        assert!(matches!(err, SizerError::InvalidInput(_)));
        assert_eq!(calc.snapshot(), before);
    }

    #[test]
    fn out_of_range_multiplier_zeroes_result_without_panicking() {
        let mut calc = Calculator::default();

        // 7e28 fits in a Decimal but stop loss × multiplier does not
        let obs = calc
            .record_observation(Some(dec!(7)), Some(Decimal::new(1, 28)))
            .unwrap();
        assert_eq!(calc.history().len(), 1);
        assert_eq!(calc.params().avg_multiplier, Some(obs.multiplier));
        assert_eq!(*calc.result(), SizingResult::ZERO);
        assert!(calc.summary().is_none());
    }

    #[test]
    fn out_of_range_ratio_changes_nothing() {
        let mut calc = Calculator::default();
        let before = calc.snapshot();

        let err = calc
            .record_observation(Some(dec!(100)), Some(Decimal::new(1, 28)))
            .unwrap_err();
        assert!(matches!(err, SizerError::InvalidInput(_)));
        assert_eq!(calc.snapshot(), before);
    }

    #[test]
    fn shared_calculator_stays_consistent_on_extreme_input() {
        let shared = SharedCalculator::default();
        let tiny = Decimal::new(1, 28);

        shared
            .update(|c| c.record_observation(Some(dec!(7)), Some(tiny)))
            .unwrap();
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.result, SizingResult::ZERO);

        // Sum of two 7e28 multipliers overflows; history keeps one entry
        assert!(shared
            .update(|c| c.record_observation(Some(dec!(7)), Some(tiny)))
            .is_err());
        assert_eq!(shared.snapshot(), snapshot);

        shared.update(Calculator::clear_history);
        assert!(close(shared.snapshot().result.potential_loss, dec!(200)));
    }

    #[test]
    fn conservative_follows_history_max() {
        let mut calc = Calculator::default();
        calc.set_method(SizingMethod::Conservative);
        assert_eq!(calc.effective_multiplier(), dec!(84.5));

        calc.record_observation(Some(dec!(10)), Some(dec!(10))).unwrap();
        calc.record_observation(Some(dec!(50)), Some(dec!(10))).unwrap();
        calc.record_observation(Some(dec!(30)), Some(dec!(10))).unwrap();

        assert_eq!(calc.effective_multiplier(), dec!(5));
        assert_eq!(calc.result().option_move_sl, dec!(10));
    }

    #[test]
    fn clear_restores_configured_default() {
        let mut config = CalculatorConfig::default();
        config.position.default_multiplier = dec!(40);
        let mut calc = Calculator::new(&config);

        calc.record_observation(Some(dec!(10)), Some(dec!(1))).unwrap();
        calc.clear_history();
        calc.clear_history();

        assert!(calc.history().is_empty());
        assert_eq!(calc.params().avg_multiplier, Some(dec!(40)));
        assert_eq!(calc.effective_multiplier(), dec!(40));
        // The last computed multiplier stays on display
        assert_eq!(calc.current_multiplier(), Some(dec!(10)));
    }

    #[test]
    fn missing_average_zeroes_result_even_for_conservative() {
        let mut calc = Calculator::default();
        calc.record_observation(Some(dec!(10)), Some(dec!(1))).unwrap();
        calc.set_method(SizingMethod::Conservative);
        calc.set_avg_multiplier(None);

        assert_eq!(*calc.result(), SizingResult::ZERO);
    }

    #[test]
    fn derived_views_follow_result() {
        let mut calc = Calculator::default();
        assert_eq!(calc.premium_targets().at_take_profit, dec!(6.0725));
        assert!(calc.summary().is_some());

        calc.set_stop_loss(Some(dec!(0)));
        assert!(calc.summary().is_none());
    }

    #[test]
    fn shared_calculator_serializes_updates() {
        let shared = SharedCalculator::default();

        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared
                        .update(|c| c.record_observation(Some(Decimal::from(i)), Some(dec!(1))))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.history.len(), 8);
        // mean of 1..=8
        assert_eq!(snapshot.params.avg_multiplier, Some(dec!(4.5)));
        assert!(close(snapshot.result.potential_loss, dec!(200)));
    }
}
