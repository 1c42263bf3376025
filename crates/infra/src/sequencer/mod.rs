//! Per-region invoice number issuance.
//!
//! Every issued number is unique within its region and the counter never
//! goes backwards, even under concurrent callers. Both backends advance the
//! counter and read the new value in one step.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentSequencer;
pub use postgres::PostgresDocumentSequencer;
pub use r#trait::{DocumentSequencer, SequenceError};
