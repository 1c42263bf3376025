//! Postgres-backed document sequencer.
//!
//! `next_number` is a single `UPDATE ... RETURNING` statement: the row lock
//! taken by the update serializes concurrent callers for the same region, so
//! no two callers can read the same counter.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use evbill_core::Region;
use evbill_invoicing::{DocumentNumber, DocumentSequence};

use crate::config::BillingConfig;
use crate::db::{describe, sqlstate};

use super::r#trait::{DocumentSequencer, SequenceError};

#[derive(Debug, Clone)]
pub struct PostgresDocumentSequencer {
    pool: Arc<PgPool>,
    pad_width: usize,
}

impl PostgresDocumentSequencer {
    pub fn new(pool: PgPool, pad_width: usize) -> Self {
        Self {
            pool: Arc::new(pool),
            pad_width,
        }
    }

    /// Insert missing region rows. Existing counters are left untouched.
    #[instrument(skip(self, config), err)]
    pub async fn seed(&self, config: &BillingConfig) -> Result<(), SequenceError> {
        for sequence in config.sequences() {
            self.seed_one(&sequence).await?;
        }
        Ok(())
    }

    async fn seed_one(&self, sequence: &DocumentSequence) -> Result<(), SequenceError> {
        let start = i64::try_from(sequence.current_number)
            .map_err(|_| SequenceError::Exhausted(sequence.region))?;
        sqlx::query(
            r#"
            INSERT INTO document_sequences (region, prefix, current_number)
            VALUES ($1, $2, $3)
            ON CONFLICT (region) DO NOTHING
            "#,
        )
        .bind(sequence.region.code())
        .bind(&sequence.prefix)
        .bind(start)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("seed_sequence", sequence.region, e))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentSequencer for PostgresDocumentSequencer {
    #[instrument(skip(self), fields(region = %region), err)]
    async fn next_number(&self, region: Region) -> Result<DocumentNumber, SequenceError> {
        let row = sqlx::query(
            r#"
            UPDATE document_sequences
            SET current_number = current_number + 1
            WHERE region = $1
            RETURNING prefix, current_number
            "#,
        )
        .bind(region.code())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("next_number", region, e))?
        .ok_or(SequenceError::UnknownRegion(region))?;

        let prefix: String = row
            .try_get("prefix")
            .map_err(|e| map_sqlx_error("next_number", region, e))?;
        let counter: i64 = row
            .try_get("current_number")
            .map_err(|e| map_sqlx_error("next_number", region, e))?;
        let counter = u64::try_from(counter)
            .map_err(|_| SequenceError::Storage(format!("negative counter {counter} for {region}")))?;

        let number = DocumentNumber::format(&prefix, counter, self.pad_width);
        tracing::info!(number = %number, "issued invoice number");
        Ok(number)
    }
}

fn map_sqlx_error(operation: &str, region: Region, err: sqlx::Error) -> SequenceError {
    // numeric_value_out_of_range: BIGINT counter overflow
    if sqlstate(&err).as_deref() == Some("22003") {
        return SequenceError::Exhausted(region);
    }
    SequenceError::Storage(describe(operation, &err))
}
