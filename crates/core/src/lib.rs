//! `evbill-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the billing crates
//! (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;
pub mod region;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{ClientId, InvoiceId, PaymentId, QuotationId};
pub use money::{VAT_RATE, round2};
pub use region::Region;
pub use value_object::ValueObject;
