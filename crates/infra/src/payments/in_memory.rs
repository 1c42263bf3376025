use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use evbill_core::{ClientId, InvoiceId, PaymentId};
use evbill_invoicing::{Invoice, NewPayment, Payment};

use super::r#trait::{PaymentStore, PaymentStoreError, ensure_unpaid};

#[derive(Debug, Default)]
struct Tables {
    invoices: HashMap<InvoiceId, Invoice>,
    /// Insertion order.
    payments: Vec<Payment>,
}

/// In-memory invoice/payment store.
///
/// Intended for tests/dev. A single lock covers both tables, so a payment
/// and its invoice update become visible together.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    tables: RwLock<Tables>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, PaymentStoreError> {
        self.tables
            .read()
            .map_err(|_| PaymentStoreError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, PaymentStoreError> {
        self.tables
            .write()
            .map_err(|_| PaymentStoreError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PaymentStoreError> {
        ensure_unpaid(invoice)?;

        let mut tables = self.write()?;
        if tables.invoices.contains_key(&invoice.id()) {
            return Err(PaymentStoreError::Conflict(format!(
                "invoice {} already exists",
                invoice.id()
            )));
        }
        if tables
            .invoices
            .values()
            .any(|existing| existing.invoice_number() == invoice.invoice_number())
        {
            return Err(PaymentStoreError::Conflict(format!(
                "invoice number {} already issued",
                invoice.invoice_number()
            )));
        }
        tables.invoices.insert(invoice.id(), invoice.clone());
        Ok(())
    }

    async fn invoice(&self, id: InvoiceId) -> Result<Invoice, PaymentStoreError> {
        self.read()?
            .invoices
            .get(&id)
            .cloned()
            .ok_or(PaymentStoreError::InvoiceNotFound(id))
    }

    async fn record_payment(
        &self,
        payment: NewPayment,
    ) -> Result<(Payment, Invoice), PaymentStoreError> {
        let payment = Payment::new(PaymentId::new(), payment)?;

        let mut tables = self.write()?;
        let mut invoice = tables
            .invoices
            .get(&payment.invoice_id())
            .cloned()
            .ok_or(PaymentStoreError::InvoiceNotFound(payment.invoice_id()))?;
        invoice.apply_payment(&payment)?;

        tables.invoices.insert(invoice.id(), invoice.clone());
        tables.payments.push(payment.clone());
        drop(tables);

        tracing::info!(
            payment_id = %payment.id(),
            invoice = %invoice.invoice_number(),
            amount = %payment.amount(),
            balance = %invoice.balance(),
            "payment recorded"
        );
        Ok((payment, invoice))
    }

    async fn delete_payment(&self, id: PaymentId) -> Result<Invoice, PaymentStoreError> {
        let mut tables = self.write()?;
        let position = tables
            .payments
            .iter()
            .position(|p| p.id() == id)
            .ok_or(PaymentStoreError::PaymentNotFound(id))?;

        let payment = &tables.payments[position];
        let mut invoice = tables
            .invoices
            .get(&payment.invoice_id())
            .cloned()
            .ok_or(PaymentStoreError::InvoiceNotFound(payment.invoice_id()))?;
        invoice.revert_payment(payment)?;

        let payment = tables.payments.remove(position);
        tables.invoices.insert(invoice.id(), invoice.clone());
        drop(tables);

        tracing::info!(
            payment_id = %id,
            invoice = %invoice.invoice_number(),
            amount = %payment.amount(),
            balance = %invoice.balance(),
            "payment deleted"
        );
        Ok(invoice)
    }

    async fn payments_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Payment>, PaymentStoreError> {
        let tables = self.read()?;
        if !tables.invoices.contains_key(&invoice_id) {
            return Err(PaymentStoreError::InvoiceNotFound(invoice_id));
        }
        Ok(tables
            .payments
            .iter()
            .filter(|p| p.invoice_id() == invoice_id)
            .cloned()
            .collect())
    }

    async fn invoices_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Invoice>, PaymentStoreError> {
        let mut invoices: Vec<Invoice> = self
            .read()?
            .invoices
            .values()
            .filter(|inv| inv.client_id() == client_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| {
            a.invoice_date()
                .cmp(&b.invoice_date())
                .then_with(|| a.invoice_number().as_str().cmp(b.invoice_number().as_str()))
        });
        Ok(invoices)
    }

    async fn payments_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Payment>, PaymentStoreError> {
        let tables = self.read()?;
        let mut payments: Vec<Payment> = tables
            .payments
            .iter()
            .filter(|p| {
                tables
                    .invoices
                    .get(&p.invoice_id())
                    .is_some_and(|inv| inv.client_id() == client_id)
            })
            .cloned()
            .collect();
        payments.sort_by_key(Payment::payment_date);
        Ok(payments)
    }
}
