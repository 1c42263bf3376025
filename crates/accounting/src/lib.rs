//! Accounting module (client statements of account).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod ledger;

pub use ledger::{Ledger, LedgerEntry, LedgerEntryKind, build_ledger};
