use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use evbill_core::{ClientId, DomainError, InvoiceId, PaymentId};
use evbill_invoicing::{Invoice, NewPayment, Payment};

#[derive(Debug, Error)]
pub enum PaymentStoreError {
    #[error("invoice {0} not found")]
    InvoiceNotFound(InvoiceId),

    #[error("payment {0} not found")]
    PaymentNotFound(PaymentId),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("payment storage error: {0}")]
    Storage(String),
}

/// Store of invoices and the payments recorded against them.
///
/// Implementations must apply `record_payment` and `delete_payment` together
/// with the matching `amount_paid` change, or not at all.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persist a newly created invoice. Invoice numbers are unique and the
    /// invoice must not carry a paid amount: `amount_paid` only ever moves
    /// through `record_payment` and `delete_payment`.
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PaymentStoreError>;

    async fn invoice(&self, id: InvoiceId) -> Result<Invoice, PaymentStoreError>;

    /// Record a payment and add its amount to the invoice's `amount_paid`.
    ///
    /// Returns the stored payment and the invoice as updated.
    async fn record_payment(
        &self,
        payment: NewPayment,
    ) -> Result<(Payment, Invoice), PaymentStoreError>;

    /// Delete a payment and subtract its amount from the invoice's
    /// `amount_paid`. Returns the updated invoice.
    async fn delete_payment(&self, id: PaymentId) -> Result<Invoice, PaymentStoreError>;

    async fn payments_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Payment>, PaymentStoreError>;

    /// All invoices of a client, ordered by invoice date.
    async fn invoices_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Invoice>, PaymentStoreError>;

    /// All payments against any invoice of a client, ordered by payment date.
    async fn payments_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Payment>, PaymentStoreError>;
}

/// New invoices start unpaid; a paid amount with no payment rows behind it
/// would break `amount_paid == sum(payments)`.
pub(crate) fn ensure_unpaid(invoice: &Invoice) -> Result<(), PaymentStoreError> {
    if invoice.amount_paid() != Decimal::ZERO {
        return Err(PaymentStoreError::Domain(DomainError::invariant(format!(
            "invoice {} cannot be inserted with amount_paid {}; record payments instead",
            invoice.invoice_number(),
            invoice.amount_paid()
        ))));
    }
    Ok(())
}
