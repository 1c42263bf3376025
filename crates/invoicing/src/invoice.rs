use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use evbill_core::{ClientId, DomainError, DomainResult, InvoiceId, Region, round2};

use crate::line_item::LineItems;
use crate::number::DocumentNumber;
use crate::payment::Payment;
use crate::status::DocumentStatus;
use crate::totals::DocumentTotals;

/// How much of an invoice has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Unpaid,
    PartiallyPaid,
    Paid,
}

/// Stored invoice columns needed to rehydrate an `Invoice`.
///
/// VAT, total and balance are not part of the snapshot: they are recomputed
/// from `net_amount` and `amount_paid` on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSnapshot {
    pub id: InvoiceId,
    pub invoice_number: DocumentNumber,
    pub client_id: ClientId,
    pub region: Region,
    pub invoice_date: NaiveDate,
    pub status: DocumentStatus,
    pub net_amount: Decimal,
    pub amount_paid: Decimal,
}

/// A tax invoice.
///
/// `balance() == total_amount() - amount_paid()` holds by construction: the
/// balance is never stored and `amount_paid` changes only by applying or
/// reverting a `Payment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: DocumentNumber,
    client_id: ClientId,
    region: Region,
    invoice_date: NaiveDate,
    status: DocumentStatus,
    totals: DocumentTotals,
    amount_paid: Decimal,
}

impl Invoice {
    /// Create a draft invoice. `invoice_number` must come from the region's
    /// document sequencer and is never reassigned afterwards.
    pub fn new(
        id: InvoiceId,
        invoice_number: DocumentNumber,
        client_id: ClientId,
        region: Region,
        invoice_date: NaiveDate,
        items: &LineItems,
    ) -> Self {
        Self {
            id,
            invoice_number,
            client_id,
            region,
            invoice_date,
            status: DocumentStatus::Draft,
            totals: items.totals(),
            amount_paid: Decimal::ZERO,
        }
    }

    /// Rehydrate from stored columns.
    pub fn restore(snapshot: InvoiceSnapshot) -> DomainResult<Self> {
        if snapshot.amount_paid < Decimal::ZERO {
            return Err(DomainError::invariant(format!(
                "invoice {} has negative amount_paid",
                snapshot.invoice_number
            )));
        }
        Ok(Self {
            id: snapshot.id,
            invoice_number: snapshot.invoice_number,
            client_id: snapshot.client_id,
            region: snapshot.region,
            invoice_date: snapshot.invoice_date,
            status: snapshot.status,
            totals: DocumentTotals::from_net(snapshot.net_amount),
            amount_paid: round2(snapshot.amount_paid),
        })
    }

    pub fn snapshot(&self) -> InvoiceSnapshot {
        InvoiceSnapshot {
            id: self.id,
            invoice_number: self.invoice_number.clone(),
            client_id: self.client_id,
            region: self.region,
            invoice_date: self.invoice_date,
            status: self.status,
            net_amount: self.totals.net_amount(),
            amount_paid: self.amount_paid,
        }
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &DocumentNumber {
        &self.invoice_number
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn totals(&self) -> DocumentTotals {
        self.totals
    }

    pub fn net_amount(&self) -> Decimal {
        self.totals.net_amount()
    }

    pub fn vat_amount(&self) -> Decimal {
        self.totals.vat_amount()
    }

    pub fn total_amount(&self) -> Decimal {
        self.totals.total_amount()
    }

    pub fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    pub fn balance(&self) -> Decimal {
        self.totals.total_amount() - self.amount_paid
    }

    pub fn payment_state(&self) -> PaymentState {
        if self.amount_paid <= Decimal::ZERO {
            PaymentState::Unpaid
        } else if self.balance() > Decimal::ZERO {
            PaymentState::PartiallyPaid
        } else {
            PaymentState::Paid
        }
    }

    pub fn set_status(&mut self, status: DocumentStatus) {
        self.status = status;
    }

    /// Replace the item list; totals are recomputed from scratch.
    pub fn replace_items(&mut self, items: &LineItems) {
        self.totals = items.totals();
    }

    /// Reflect a newly recorded payment in `amount_paid`.
    pub fn apply_payment(&mut self, payment: &Payment) -> DomainResult<()> {
        self.ensure_owns(payment)?;
        self.amount_paid = round2(self.amount_paid + payment.amount());
        Ok(())
    }

    /// Undo a previously applied payment (payment deletion).
    pub fn revert_payment(&mut self, payment: &Payment) -> DomainResult<()> {
        self.ensure_owns(payment)?;
        if payment.amount() > self.amount_paid {
            return Err(DomainError::invariant(format!(
                "reverting {} would make amount_paid of invoice {} negative",
                payment.amount(),
                self.invoice_number
            )));
        }
        self.amount_paid = round2(self.amount_paid - payment.amount());
        Ok(())
    }

    fn ensure_owns(&self, payment: &Payment) -> DomainResult<()> {
        if payment.invoice_id() != self.id {
            return Err(DomainError::conflict(format!(
                "payment {} belongs to invoice {}, not {}",
                payment.id(),
                payment.invoice_id(),
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::LineItem;
    use crate::payment::NewPayment;
    use crate::status::PaymentMode;
    use evbill_core::PaymentId;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    /// Net 952.38 gives VAT 47.62 and a total of exactly 1000.00.
    fn invoice_totalling_1000() -> Invoice {
        let mut items = LineItems::new();
        items.push_item(LineItem::new("Venue", dec!(1), dec!(952.38)));
        let invoice = Invoice::new(
            InvoiceId::new(),
            DocumentNumber::format("INV-UAE-", 1, 4),
            ClientId::new(),
            Region::Uae,
            day(1),
            &items,
        );
        assert_eq!(invoice.total_amount(), dec!(1000.00));
        invoice
    }

    fn payment_for(invoice: &Invoice, amount: Decimal) -> Payment {
        Payment::new(
            PaymentId::new(),
            NewPayment {
                invoice_id: invoice.id(),
                amount,
                payment_date: day(2),
                payment_mode: PaymentMode::BankTransfer,
                reference_number: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn new_invoice_is_unpaid_draft_with_derived_totals() {
        let invoice = invoice_totalling_1000();
        assert_eq!(invoice.status(), DocumentStatus::Draft);
        assert_eq!(invoice.net_amount(), dec!(952.38));
        assert_eq!(invoice.vat_amount(), dec!(47.62));
        assert_eq!(invoice.amount_paid(), Decimal::ZERO);
        assert_eq!(invoice.balance(), dec!(1000.00));
        assert_eq!(invoice.payment_state(), PaymentState::Unpaid);
    }

    #[test]
    fn pay_in_two_parts_then_delete_second_payment() {
        let mut invoice = invoice_totalling_1000();
        let first = payment_for(&invoice, dec!(400));
        let second = payment_for(&invoice, dec!(600));

        invoice.apply_payment(&first).unwrap();
        assert_eq!(invoice.payment_state(), PaymentState::PartiallyPaid);
        invoice.apply_payment(&second).unwrap();
        assert_eq!(invoice.amount_paid(), dec!(1000));
        assert_eq!(invoice.balance(), dec!(0));
        assert_eq!(invoice.payment_state(), PaymentState::Paid);

        invoice.revert_payment(&second).unwrap();
        assert_eq!(invoice.amount_paid(), dec!(400));
        assert_eq!(invoice.balance(), dec!(600));
    }

    #[test]
    fn payment_for_another_invoice_is_rejected() {
        let mut invoice = invoice_totalling_1000();
        let other = invoice_totalling_1000();
        let payment = payment_for(&other, dec!(10));

        let err = invoice.apply_payment(&payment).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(invoice.amount_paid(), Decimal::ZERO);
    }

    #[test]
    fn reverting_more_than_paid_is_rejected() {
        let mut invoice = invoice_totalling_1000();
        let payment = payment_for(&invoice, dec!(10));
        let err = invoice.revert_payment(&payment).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn replacing_items_recomputes_totals_and_keeps_payments() {
        let mut invoice = invoice_totalling_1000();
        invoice.apply_payment(&payment_for(&invoice, dec!(100))).unwrap();

        let mut items = LineItems::new();
        items.push_item(LineItem::new("Stage", dec!(2), dec!(100)));
        invoice.replace_items(&items);

        assert_eq!(invoice.total_amount(), dec!(210));
        assert_eq!(invoice.balance(), dec!(110));
    }

    #[test]
    fn snapshot_restores_identical_invoice() {
        let mut invoice = invoice_totalling_1000();
        invoice.apply_payment(&payment_for(&invoice, dec!(250.5))).unwrap();
        invoice.set_status(DocumentStatus::Sent);

        let restored = Invoice::restore(invoice.snapshot()).unwrap();
        assert_eq!(restored, invoice);
    }

    #[test]
    fn restore_rejects_negative_paid_amount() {
        let mut snapshot = invoice_totalling_1000().snapshot();
        snapshot.amount_paid = dec!(-1);
        assert!(Invoice::restore(snapshot).is_err());
    }

    proptest! {
        /// Property: after any sequence of payment creations/deletions the
        /// balance equals total minus the sum of payments still active.
        #[test]
        fn balance_tracks_active_payments(
            ops in prop::collection::vec((1i64..50_000i64, any::<bool>()), 1..30)
        ) {
            let mut invoice = invoice_totalling_1000();
            let mut active: Vec<Payment> = Vec::new();

            for (cents, delete) in ops {
                if delete && !active.is_empty() {
                    let removed = active.remove(0);
                    invoice.revert_payment(&removed).unwrap();
                } else {
                    let payment = payment_for(&invoice, Decimal::new(cents, 2));
                    invoice.apply_payment(&payment).unwrap();
                    active.push(payment);
                }

                let paid: Decimal = active.iter().map(Payment::amount).sum();
                prop_assert_eq!(invoice.amount_paid(), paid);
                prop_assert_eq!(invoice.balance(), invoice.total_amount() - paid);
            }
        }
    }
}
