//! Document numbering.
//!
//! Invoice numbers are fiscal: they come only from a region's
//! `DocumentSequence`. Quotation numbers are not sequence-controlled and are
//! either user-supplied or derived from the creation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evbill_core::{DomainError, DomainResult, Region, ValueObject};

/// Zero-padding width used when no configuration overrides it.
pub const DEFAULT_PAD_WIDTH: usize = 4;

/// An issued invoice number, e.g. `INV-UAE-0042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentNumber(String);

impl ValueObject for DocumentNumber {}

impl DocumentNumber {
    /// `prefix + zero-padded(counter)`.
    pub fn format(prefix: &str, counter: u64, pad_width: usize) -> Self {
        Self(format!("{prefix}{counter:0pad_width$}"))
    }

    /// Wrap a number read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing counter digits, if any.
    ///
    /// Only unambiguous when the prefix ends in a non-digit: the digits of a
    /// prefix such as `INV2024` would be read as part of the counter.
    /// `BillingConfig` rejects such prefixes.
    pub fn numeric_suffix(&self) -> Option<u64> {
        let digits_start = self
            .0
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|idx| idx + 1)
            .unwrap_or(0);
        self.0[digits_start..].parse().ok()
    }
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-region invoice counter. `current_number` only ever increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSequence {
    pub region: Region,
    pub prefix: String,
    pub current_number: u64,
}

impl DocumentSequence {
    pub fn new(region: Region, prefix: impl Into<String>) -> Self {
        Self {
            region,
            prefix: prefix.into(),
            current_number: 0,
        }
    }

    /// Advance the counter and return the newly issued number.
    ///
    /// Callers persisting the sequence must store the advanced state before
    /// handing the number out.
    pub fn issue_next(&mut self, pad_width: usize) -> DomainResult<DocumentNumber> {
        let next = self.current_number.checked_add(1).ok_or_else(|| {
            DomainError::invariant(format!("document sequence for {} is exhausted", self.region))
        })?;
        self.current_number = next;
        Ok(DocumentNumber::format(&self.prefix, next, pad_width))
    }
}

/// Number of a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotationNumber(String);

impl ValueObject for QuotationNumber {}

impl QuotationNumber {
    /// A user-supplied quotation number.
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("quotation number must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// `QT-<unix millis>` for quotations created without an explicit number.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(format!("QT-{}", at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for QuotationNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
