//! Money reconciliation between optical readings and local predictions.
//!
//! Two sources race: a background sampler reading the on-screen balance and
//! the decision loop subtracting what it spends. Each value carries the time
//! it was written and the newer one is reported (last writer wins).

use std::time::Instant;

/// Last optical reading and locally predicted balance, each time-stamped.
///
/// The predicted value only ever decreases, clamped at zero. The optical
/// value may move either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoneyLedger {
    optical: u32,
    optical_at: Option<Instant>,
    predicted: u32,
    predicted_at: Option<Instant>,
}

impl MoneyLedger {
    /// Empty ledger; reports 0 until something is recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded with a known starting balance as its prediction.
    #[must_use]
    pub fn with_prediction(initial: u32) -> Self {
        Self {
            predicted: initial,
            predicted_at: Some(Instant::now()),
            ..Self::default()
        }
    }

    /// Start a new prediction from a known balance, e.g. on entering a match.
    pub fn reset_prediction(&mut self, initial: u32) {
        self.predicted = initial;
        self.predicted_at = Some(Instant::now());
    }

    /// Store an optical reading taken now.
    pub fn record_optical(&mut self, value: u32) {
        self.record_optical_at(value, Instant::now());
    }

    /// Store an optical reading taken at `at`.
    pub fn record_optical_at(&mut self, value: u32, at: Instant) {
        self.optical = value;
        self.optical_at = Some(at);
    }

    /// Subtract a spend from the prediction, stamped now.
    pub fn apply_spend(&mut self, amount: u32) {
        self.apply_spend_at(amount, Instant::now());
    }

    /// Subtract a spend from the prediction, stamped `at`.
    pub fn apply_spend_at(&mut self, amount: u32, at: Instant) {
        self.predicted = self.predicted.saturating_sub(amount);
        self.predicted_at = Some(at);
    }

    /// The newer of the two values.
    ///
    /// Without any prediction the optical value is authoritative. When both
    /// carry the same timestamp the prediction wins.
    #[must_use]
    pub fn reported_balance(&self) -> u32 {
        match (self.optical_at, self.predicted_at) {
            (Some(optical), Some(predicted)) if optical > predicted => self.optical,
            (_, Some(_)) => self.predicted,
            (_, None) => self.optical,
        }
    }

    /// Last optical value and when it was read.
    #[must_use]
    pub const fn optical(&self) -> (u32, Option<Instant>) {
        (self.optical, self.optical_at)
    }

    /// Current prediction and when it was last changed.
    #[must_use]
    pub const fn predicted(&self) -> (u32, Option<Instant>) {
        (self.predicted, self.predicted_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    #[test]
    fn test_spend_then_newer_optical() {
        let start = Instant::now();
        let mut ledger = MoneyLedger::with_prediction(1000);
        ledger.apply_spend_at(300, start + Duration::from_millis(10));
        assert_eq!(ledger.reported_balance(), 700);

        ledger.record_optical_at(650, start + Duration::from_millis(20));
        assert_eq!(ledger.reported_balance(), 650);
    }

    #[test]
    fn test_stale_optical_is_ignored() {
        let start = Instant::now();
        let mut ledger = MoneyLedger::new();
        ledger.record_optical_at(900, start);
        assert_eq!(ledger.reported_balance(), 900);

        ledger.apply_spend_at(100, start + Duration::from_millis(5));
        // prediction was never seeded, so it clamps at zero
        assert_eq!(ledger.reported_balance(), 0);
        ledger.record_optical_at(800, start + Duration::from_millis(5));
        assert_eq!(ledger.reported_balance(), 0, "prediction wins ties");
        ledger.record_optical_at(800, start + Duration::from_millis(6));
        assert_eq!(ledger.reported_balance(), 800);
    }

    #[test]
    fn test_optical_only() {
        let mut ledger = MoneyLedger::new();
        assert_eq!(ledger.reported_balance(), 0);
        ledger.record_optical(1234);
        assert_eq!(ledger.reported_balance(), 1234);
        ledger.record_optical(4000);
        assert_eq!(ledger.optical().0, 4000);
    }

    proptest! {
        #[test]
        fn prop_spends_clamp_at_zero(
            initial in 0u32..100_000,
            spends in prop::collection::vec(0u32..20_000, 0..20),
        ) {
            let start = Instant::now();
            let mut ledger = MoneyLedger::with_prediction(initial);
            for (i, amount) in spends.iter().enumerate() {
                let before = ledger.predicted().0;
                ledger.apply_spend_at(*amount, start + Duration::from_millis(i as u64 + 1));
                prop_assert!(ledger.predicted().0 <= before);
            }
            let total: u64 = spends.iter().map(|s| u64::from(*s)).sum();
            let expected = u64::from(initial).saturating_sub(total);
            prop_assert_eq!(u64::from(ledger.reported_balance()), expected);
        }

        #[test]
        fn prop_newer_value_reported(
            optical in 0u32..10_000,
            predicted in 0u32..10_000,
            optical_later in any::<bool>(),
        ) {
            let start = Instant::now();
            let mut ledger = MoneyLedger::with_prediction(predicted);
            let (t_pred, t_opt) = if optical_later {
                (start + Duration::from_millis(1), start + Duration::from_millis(2))
            } else {
                (start + Duration::from_millis(2), start + Duration::from_millis(1))
            };
            ledger.apply_spend_at(0, t_pred);
            ledger.record_optical_at(optical, t_opt);
            let expected = if optical_later { optical } else { predicted };
            prop_assert_eq!(ledger.reported_balance(), expected);
        }
    }
}
