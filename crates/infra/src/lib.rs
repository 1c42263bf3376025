//! Infrastructure layer: config, database wiring and the billing stores.

pub mod config;
pub mod db;
pub mod payments;
pub mod sequencer;

#[cfg(test)]
mod integration_tests;

pub use config::BillingConfig;
pub use payments::{InMemoryPaymentStore, PaymentStore, PaymentStoreError, PostgresPaymentStore};
pub use sequencer::{
    DocumentSequencer, InMemoryDocumentSequencer, PostgresDocumentSequencer, SequenceError,
};
