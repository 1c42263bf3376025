//! Apply the billing schema and seed the per-region invoice sequences.
//!
//! Reads `DATABASE_URL` and the `EVBILL_*` variables; safe to run repeatedly.

use evbill_infra::{BillingConfig, PostgresDocumentSequencer, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    evbill_observability::init();

    let config = BillingConfig::from_env();
    let pool = db::connect(&config).await?;

    db::ensure_schema(&pool).await?;

    let sequencer = PostgresDocumentSequencer::new(pool, config.sequence_pad_width);
    sequencer.seed(&config).await?;

    tracing::info!(
        uae_prefix = %config.uae_invoice_prefix,
        saudi_prefix = %config.saudi_invoice_prefix,
        "billing database ready"
    );
    Ok(())
}
