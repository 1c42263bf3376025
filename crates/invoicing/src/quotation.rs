use chrono::NaiveDate;
use rust_decimal::Decimal;

use evbill_core::{ClientId, QuotationId, Region};

use crate::line_item::LineItems;
use crate::number::QuotationNumber;
use crate::status::DocumentStatus;
use crate::totals::DocumentTotals;

/// A quotation: an invoice-shaped document without payments.
///
/// Its number is user-supplied or timestamp-derived and deliberately never
/// drawn from the invoice sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quotation {
    id: QuotationId,
    quotation_number: QuotationNumber,
    client_id: ClientId,
    region: Region,
    quotation_date: NaiveDate,
    status: DocumentStatus,
    totals: DocumentTotals,
}

impl Quotation {
    pub fn new(
        id: QuotationId,
        quotation_number: QuotationNumber,
        client_id: ClientId,
        region: Region,
        quotation_date: NaiveDate,
        items: &LineItems,
    ) -> Self {
        Self {
            id,
            quotation_number,
            client_id,
            region,
            quotation_date,
            status: DocumentStatus::Draft,
            totals: items.totals(),
        }
    }

    pub fn id(&self) -> QuotationId {
        self.id
    }

    pub fn quotation_number(&self) -> &QuotationNumber {
        &self.quotation_number
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn quotation_date(&self) -> NaiveDate {
        self.quotation_date
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn totals(&self) -> DocumentTotals {
        self.totals
    }

    pub fn total_amount(&self) -> Decimal {
        self.totals.total_amount()
    }

    pub fn set_status(&mut self, status: DocumentStatus) {
        self.status = status;
    }

    /// Replace the item list; totals are recomputed from scratch.
    pub fn replace_items(&mut self, items: &LineItems) {
        self.totals = items.totals();
    }
}
