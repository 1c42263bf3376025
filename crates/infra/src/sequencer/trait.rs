use async_trait::async_trait;
use thiserror::Error;

use evbill_core::Region;
use evbill_invoicing::DocumentNumber;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("no document sequence configured for region {0}")]
    UnknownRegion(Region),

    #[error("document sequence for region {0} is exhausted")]
    Exhausted(Region),

    #[error("sequence storage error: {0}")]
    Storage(String),
}

/// Issues invoice numbers from a region's sequence.
///
/// `next_number` must behave as a single atomic "increment and read": two
/// concurrent calls for the same region never observe the same counter, and
/// a number handed out is never handed out again.
#[async_trait]
pub trait DocumentSequencer: Send + Sync {
    async fn next_number(&self, region: Region) -> Result<DocumentNumber, SequenceError>;
}
