use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use evbill_core::{DomainError, DomainResult, InvoiceId, PaymentId, round2};

use crate::status::PaymentMode;

/// Request to record a payment against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub reference_number: Option<String>,
}

/// A payment received against exactly one invoice. `amount > 0` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    invoice_id: InvoiceId,
    amount: Decimal,
    payment_date: NaiveDate,
    payment_mode: PaymentMode,
    reference_number: Option<String>,
}

impl Payment {
    pub fn new(id: PaymentId, new: NewPayment) -> DomainResult<Self> {
        let amount = round2(new.amount);
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }

        let reference_number = new
            .reference_number
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(Self {
            id,
            invoice_id: new.invoice_id,
            amount,
            payment_date: new.payment_date,
            payment_mode: new.payment_mode,
            reference_number,
        })
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn payment_date(&self) -> NaiveDate {
        self.payment_date
    }

    pub fn payment_mode(&self) -> PaymentMode {
        self.payment_mode
    }

    pub fn reference_number(&self) -> Option<&str> {
        self.reference_number.as_deref()
    }
}
