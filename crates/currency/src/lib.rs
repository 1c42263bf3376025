//! Currency presentation for billing documents.
//!
//! Maps regions to currency codes and unit names, and renders amounts in
//! English words for printed quotations, invoices and statements. Everything
//! here is display-only and fails open to the UAE policy.

pub mod policy;
pub mod words;

pub use policy::{CurrencyNames, CurrencyPolicy};
pub use words::to_words;
