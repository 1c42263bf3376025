use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use evbill_core::Region;
use evbill_invoicing::{DocumentNumber, DocumentSequence};

use crate::config::BillingConfig;

use super::r#trait::{DocumentSequencer, SequenceError};

/// In-memory document sequencer.
///
/// Intended for tests/dev. The mutex is held only for the increment itself.
#[derive(Debug)]
pub struct InMemoryDocumentSequencer {
    sequences: Mutex<HashMap<Region, DocumentSequence>>,
    pad_width: usize,
}

impl Default for InMemoryDocumentSequencer {
    fn default() -> Self {
        Self::from_config(&BillingConfig::default())
    }
}

impl InMemoryDocumentSequencer {
    /// A sequencer with no regions configured.
    pub fn empty(pad_width: usize) -> Self {
        Self {
            sequences: Mutex::new(HashMap::new()),
            pad_width,
        }
    }

    pub fn from_config(config: &BillingConfig) -> Self {
        let sequencer = Self::empty(config.sequence_pad_width);
        for sequence in config.sequences() {
            sequencer.seed(sequence);
        }
        sequencer
    }

    /// Install a region's sequence if the region has none yet.
    ///
    /// An existing counter is never replaced, so numbers already issued are
    /// never handed out again.
    pub fn seed(&self, sequence: DocumentSequence) {
        let mut sequences = match self.sequences.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sequences.entry(sequence.region).or_insert(sequence);
    }

    /// Last issued counter for `region` (0 if none issued yet).
    pub fn current(&self, region: Region) -> Result<u64, SequenceError> {
        let sequences = self
            .sequences
            .lock()
            .map_err(|_| SequenceError::Storage("lock poisoned".to_string()))?;
        sequences
            .get(&region)
            .map(|s| s.current_number)
            .ok_or(SequenceError::UnknownRegion(region))
    }

    pub fn pad_width(&self) -> usize {
        self.pad_width
    }
}

#[async_trait]
impl DocumentSequencer for InMemoryDocumentSequencer {
    async fn next_number(&self, region: Region) -> Result<DocumentNumber, SequenceError> {
        let number = {
            let mut sequences = self
                .sequences
                .lock()
                .map_err(|_| SequenceError::Storage("lock poisoned".to_string()))?;
            let sequence = sequences
                .get_mut(&region)
                .ok_or(SequenceError::UnknownRegion(region))?;
            sequence
                .issue_next(self.pad_width)
                .map_err(|_| SequenceError::Exhausted(region))?
        };

        tracing::info!(region = %region, number = %number, "issued invoice number");
        Ok(number)
    }
}
