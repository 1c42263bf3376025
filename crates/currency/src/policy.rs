use rust_decimal::Decimal;
use serde::Serialize;

use evbill_core::{Region, round2};

/// Two-tier unit names used when spelling out amounts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyNames {
    pub main: &'static str,
    pub sub: &'static str,
}

/// Currency conventions of a region.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyPolicy {
    code: &'static str,
    names: CurrencyNames,
}

const UAE: CurrencyPolicy = CurrencyPolicy {
    code: "AED",
    names: CurrencyNames {
        main: "Dirhams",
        sub: "Fils",
    },
};

const SAUDI: CurrencyPolicy = CurrencyPolicy {
    code: "SAR",
    names: CurrencyNames {
        main: "Riyals",
        sub: "Halalas",
    },
};

impl CurrencyPolicy {
    pub fn for_region(region: Region) -> Self {
        match region {
            Region::Uae => UAE,
            Region::Saudi => SAUDI,
        }
    }

    /// Policy for a raw region code. Unrecognised codes get the UAE policy.
    pub fn for_code(code: &str) -> Self {
        code.parse::<Region>()
            .map(Self::for_region)
            .unwrap_or(UAE)
    }

    /// ISO currency code, e.g. `"AED"`.
    pub fn currency_code(&self) -> &'static str {
        self.code
    }

    pub fn currency_names(&self) -> CurrencyNames {
        self.names
    }

    /// `"AED 1,500.50"`: code, thousands-separated integer part, two decimals.
    pub fn format_amount(&self, amount: Decimal) -> String {
        let rounded = round2(amount);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (idx, ch) in int_part.chars().enumerate() {
            if idx > 0 && (int_part.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{} {sign}{grouped}.{frac_part}", self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn region_currency_codes() {
        assert_eq!(CurrencyPolicy::for_region(Region::Uae).currency_code(), "AED");
        assert_eq!(CurrencyPolicy::for_region(Region::Saudi).currency_code(), "SAR");
    }

    #[test]
    fn region_unit_names() {
        let saudi = CurrencyPolicy::for_region(Region::Saudi).currency_names();
        assert_eq!(saudi.main, "Riyals");
        assert_eq!(saudi.sub, "Halalas");

        let uae = CurrencyPolicy::for_region(Region::Uae).currency_names();
        assert_eq!(uae.main, "Dirhams");
        assert_eq!(uae.sub, "Fils");
    }

    #[test]
    fn unknown_codes_fall_back_to_uae() {
        for code in ["", "uae", "EGYPT", "saudi"] {
            let policy = CurrencyPolicy::for_code(code);
            assert_eq!(policy.currency_code(), "AED", "code {code:?}");
            assert_eq!(policy.currency_names().main, "Dirhams");
        }
        assert_eq!(CurrencyPolicy::for_code("SAUDI").currency_code(), "SAR");
    }

    #[test]
    fn formats_with_thousands_separators() {
        let uae = CurrencyPolicy::for_region(Region::Uae);
        assert_eq!(uae.format_amount(dec!(1500.5)), "AED 1,500.50");
        assert_eq!(uae.format_amount(dec!(0)), "AED 0.00");
        assert_eq!(uae.format_amount(dec!(999)), "AED 999.00");
        assert_eq!(uae.format_amount(dec!(1234567.891)), "AED 1,234,567.89");

        let saudi = CurrencyPolicy::for_region(Region::Saudi);
        assert_eq!(saudi.format_amount(dec!(100000)), "SAR 100,000.00");
    }
}
