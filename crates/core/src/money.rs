//! Monetary arithmetic shared by every document computation.
//!
//! Amounts are `Decimal`s. Only multiplication, addition and rounding are used;
//! there is no division anywhere in the financial core.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fixed VAT rate (5%). Changing it is a code change, not a runtime parameter.
pub const VAT_RATE: Decimal = dec!(0.05);

/// Round to 2 decimal places, half away from zero.
///
/// Every place that produces a monetary value goes through this function so
/// repeated recalculation never drifts.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round2(dec!(0.125)), dec!(0.13));
        assert_eq!(round2(dec!(0.124)), dec!(0.12));
        assert_eq!(round2(dec!(16.5)), dec!(16.50));
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
    }

    proptest! {
        #[test]
        fn round2_is_idempotent(units in 0i64..1_000_000_000i64, scale in 0u32..6) {
            let value = Decimal::new(units, scale);
            let once = round2(value);
            prop_assert_eq!(round2(once), once);
            prop_assert!(once.scale() <= 2);
        }
    }
}
