use rust_decimal::Decimal;
use serde::Serialize;

use evbill_core::{VAT_RATE, ValueObject, round2};

use crate::line_item::LineItems;

/// Net/VAT/total of a quotation or invoice.
///
/// Only constructible by aggregation, so a hand-edited total cannot exist.
/// VAT is computed from the already-rounded net amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentTotals {
    net_amount: Decimal,
    vat_amount: Decimal,
    total_amount: Decimal,
}

impl ValueObject for DocumentTotals {}

impl DocumentTotals {
    /// Totals of an empty document.
    pub fn zero() -> Self {
        Self::from_net(Decimal::ZERO)
    }

    /// Derive VAT and total from a net amount.
    pub fn from_net(net: Decimal) -> Self {
        let net_amount = round2(net);
        let vat_amount = round2(net_amount * VAT_RATE);
        let total_amount = round2(net_amount + vat_amount);
        Self {
            net_amount,
            vat_amount,
            total_amount,
        }
    }

    /// Aggregate line amounts into totals.
    pub fn from_amounts<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        Self::from_net(amounts.into_iter().sum())
    }

    pub fn net_amount(&self) -> Decimal {
        self.net_amount
    }

    pub fn vat_amount(&self) -> Decimal {
        self.vat_amount
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }
}

impl Default for DocumentTotals {
    fn default() -> Self {
        Self::zero()
    }
}

/// Recompute totals from every item and sub-item of a document.
///
/// Call this whenever the item list changes; the result replaces any
/// previously computed totals.
pub fn aggregate(items: &LineItems) -> DocumentTotals {
    DocumentTotals::from_amounts(items.amounts())
}
