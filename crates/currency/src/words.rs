//! Amount-in-words rendering ("One Thousand Five Hundred Dirhams and Fifty Fils Only").

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use evbill_core::{Region, round2};

use crate::policy::CurrencyPolicy;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Spell `amount` in English words using the region's currency unit names.
pub fn to_words(amount: Decimal, region: Region) -> String {
    CurrencyPolicy::for_region(region).amount_in_words(amount)
}

impl CurrencyPolicy {
    /// Spell `amount` in English words with this policy's unit names.
    ///
    /// The amount is rounded to 2 places before being split, so the fractional
    /// part is always 0..=99 sub-units. Negative amounts are spelled by magnitude.
    pub fn amount_in_words(&self, amount: Decimal) -> String {
        let names = self.currency_names();
        let rounded = round2(amount).abs();
        let whole = rounded.trunc();
        let cents = ((rounded - whole) * Decimal::ONE_HUNDRED)
            .trunc()
            .to_u64()
            .unwrap_or(0);
        let whole = whole.to_u128().unwrap_or(0);

        let mut out = if whole == 0 {
            "Zero".to_string()
        } else {
            spell(whole)
        };
        out.push(' ');
        out.push_str(names.main);

        if cents > 0 {
            out.push_str(" and ");
            out.push_str(&spell(u128::from(cents)));
            out.push(' ');
            out.push_str(names.sub);
        }

        out.push_str(" Only");
        out
    }
}

/// Short-scale rendering of a non-negative integer. Zero renders as "".
fn spell(n: u128) -> String {
    let raw = match n {
        0 => String::new(),
        1..=19 => ONES[n as usize].to_string(),
        20..=99 => format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize]),
        100..=999 => format!("{} Hundred {}", ONES[(n / 100) as usize], spell(n % 100)),
        1_000..=999_999 => format!("{} Thousand {}", spell(n / 1_000), spell(n % 1_000)),
        _ => format!("{} Million {}", spell(n / 1_000_000), spell(n % 1_000_000)),
    };
    raw.trim().to_string()
}
