//! Invoice and payment persistence.
//!
//! Recording or deleting a payment and adjusting the owning invoice's
//! `amount_paid` happen as one atomic unit: no reader ever sees the payment
//! without its effect on the invoice, or the reverse.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryPaymentStore;
pub use postgres::PostgresPaymentStore;
pub use r#trait::{PaymentStore, PaymentStoreError};
