//! Postgres-backed invoice/payment store.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | PaymentStoreError |
//! |------------|-----------------|-------------------|
//! | unique violation | `23505` | `Conflict` |
//! | check violation | `23514` | `Domain` (invariant violation) |
//! | anything else | any | `Storage` |
//!
//! `record_payment` and `delete_payment` each run in one transaction that
//! both touches the `payments` row and adjusts `invoices.amount_paid` in
//! place (`amount_paid = amount_paid +/- $n`), so concurrent payments on the
//! same invoice serialize on the invoice row lock instead of overwriting
//! each other.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use evbill_core::{ClientId, DomainError, InvoiceId, PaymentId, Region};
use evbill_invoicing::{
    DocumentNumber, DocumentStatus, Invoice, InvoiceSnapshot, NewPayment, Payment, PaymentMode,
};

use crate::db::{describe, is_check_violation, is_unique_violation};

use super::r#trait::{PaymentStore, PaymentStoreError, ensure_unpaid};

const INVOICE_COLUMNS: &str = "id, invoice_number, client_id, region, invoice_date, status, net_amount, amount_paid";
const PAYMENT_COLUMNS: &str = "id, invoice_id, amount, payment_date, payment_mode, reference_number";

#[derive(Debug, Clone)]
pub struct PostgresPaymentStore {
    pool: Arc<PgPool>,
}

impl PostgresPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.invoice_number()), err)]
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), PaymentStoreError> {
        ensure_unpaid(invoice)?;

        // amount_paid takes its column default of 0
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, client_id, region, invoice_date, status,
                net_amount, vat_amount, total_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(invoice.id().as_uuid())
        .bind(invoice.invoice_number().as_str())
        .bind(invoice.client_id().as_uuid())
        .bind(invoice.region().code())
        .bind(invoice.invoice_date())
        .bind(invoice.status().as_str())
        .bind(invoice.net_amount())
        .bind(invoice.vat_amount())
        .bind(invoice.total_amount())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_invoice", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(invoice_id = %id), err)]
    async fn invoice(&self, id: InvoiceId) -> Result<Invoice, PaymentStoreError> {
        let row = sqlx::query(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_invoice", e))?
            .ok_or(PaymentStoreError::InvoiceNotFound(id))?;
        invoice_from_row(&row)
    }

    #[instrument(
        skip(self, payment),
        fields(invoice_id = %payment.invoice_id, amount = %payment.amount),
        err
    )]
    async fn record_payment(
        &self,
        payment: NewPayment,
    ) -> Result<(Payment, Invoice), PaymentStoreError> {
        let payment = Payment::new(PaymentId::new(), payment)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query(&format!(
            "UPDATE invoices SET amount_paid = amount_paid + $2 WHERE id = $1 RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(payment.invoice_id().as_uuid())
        .bind(payment.amount())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_payment", e))?;

        let Some(row) = updated else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(PaymentStoreError::InvoiceNotFound(payment.invoice_id()));
        };
        let invoice = invoice_from_row(&row)?;

        sqlx::query(
            r#"
            INSERT INTO payments (id, invoice_id, amount, payment_date, payment_mode, reference_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(payment.id().as_uuid())
        .bind(payment.invoice_id().as_uuid())
        .bind(payment.amount())
        .bind(payment.payment_date())
        .bind(payment.payment_mode().as_str())
        .bind(payment.reference_number())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_payment", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::info!(
            payment_id = %payment.id(),
            invoice = %invoice.invoice_number(),
            balance = %invoice.balance(),
            "payment recorded"
        );
        Ok((payment, invoice))
    }

    #[instrument(skip(self), fields(payment_id = %id), err)]
    async fn delete_payment(&self, id: PaymentId) -> Result<Invoice, PaymentStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let deleted = sqlx::query("DELETE FROM payments WHERE id = $1 RETURNING invoice_id, amount")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_payment", e))?;

        let Some(deleted) = deleted else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(PaymentStoreError::PaymentNotFound(id));
        };
        let invoice_id: Uuid = get(&deleted, "invoice_id")?;
        let amount: rust_decimal::Decimal = get(&deleted, "amount")?;

        // amount_paid >= 0 is enforced by a CHECK constraint; a violation
        // aborts the transaction and the payment row survives.
        let row = sqlx::query(&format!(
            "UPDATE invoices SET amount_paid = amount_paid - $2 WHERE id = $1 RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(invoice_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("revert_payment", e))?
        .ok_or(PaymentStoreError::InvoiceNotFound(InvoiceId::from_uuid(invoice_id)))?;
        let invoice = invoice_from_row(&row)?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::info!(
            invoice = %invoice.invoice_number(),
            amount = %amount,
            balance = %invoice.balance(),
            "payment deleted"
        );
        Ok(invoice)
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id), err)]
    async fn payments_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Payment>, PaymentStoreError> {
        // Distinguish "no payments" from "no invoice".
        self.invoice(invoice_id).await?;

        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE invoice_id = $1 ORDER BY created_at, id"
        ))
        .bind(invoice_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("payments_for_invoice", e))?;
        rows.iter().map(payment_from_row).collect()
    }

    #[instrument(skip(self), fields(client_id = %client_id), err)]
    async fn invoices_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Invoice>, PaymentStoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE client_id = $1 ORDER BY invoice_date, invoice_number"
        ))
        .bind(client_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("invoices_for_client", e))?;
        rows.iter().map(invoice_from_row).collect()
    }

    #[instrument(skip(self), fields(client_id = %client_id), err)]
    async fn payments_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Payment>, PaymentStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.invoice_id, p.amount, p.payment_date, p.payment_mode, p.reference_number
            FROM payments p
            JOIN invoices i ON i.id = p.invoice_id
            WHERE i.client_id = $1
            ORDER BY p.payment_date, p.created_at, p.id
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("payments_for_client", e))?;
        rows.iter().map(payment_from_row).collect()
    }
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, PaymentStoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| PaymentStoreError::Storage(format!("failed to read column {column}: {e}")))
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice, PaymentStoreError> {
    let region: String = get(row, "region")?;
    let status: String = get(row, "status")?;
    let number: String = get(row, "invoice_number")?;

    let snapshot = InvoiceSnapshot {
        id: InvoiceId::from_uuid(get(row, "id")?),
        invoice_number: DocumentNumber::from_stored(number),
        client_id: ClientId::from_uuid(get(row, "client_id")?),
        region: region.parse::<Region>()?,
        invoice_date: get(row, "invoice_date")?,
        status: status.parse::<DocumentStatus>()?,
        net_amount: get(row, "net_amount")?,
        amount_paid: get(row, "amount_paid")?,
    };
    Ok(Invoice::restore(snapshot)?)
}

fn payment_from_row(row: &PgRow) -> Result<Payment, PaymentStoreError> {
    let mode: String = get(row, "payment_mode")?;
    let payment = Payment::new(
        PaymentId::from_uuid(get(row, "id")?),
        NewPayment {
            invoice_id: InvoiceId::from_uuid(get(row, "invoice_id")?),
            amount: get(row, "amount")?,
            payment_date: get(row, "payment_date")?,
            payment_mode: mode.parse::<PaymentMode>()?,
            reference_number: get(row, "reference_number")?,
        },
    )?;
    Ok(payment)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> PaymentStoreError {
    let msg = describe(operation, &err);
    if is_unique_violation(&err) {
        PaymentStoreError::Conflict(msg)
    } else if is_check_violation(&err) {
        PaymentStoreError::Domain(DomainError::invariant(msg))
    } else {
        PaymentStoreError::Storage(msg)
    }
}
