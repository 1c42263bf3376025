//! Invoicing domain module.
//!
//! Business rules for quotations, invoices and their payments, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). Totals
//! are always derived from line items and an invoice's balance is always
//! derived from its total and paid amount; neither is ever accepted as input.

pub mod invoice;
pub mod line_item;
pub mod number;
pub mod payment;
pub mod quotation;
pub mod status;
pub mod totals;

pub use invoice::{Invoice, InvoiceSnapshot, PaymentState};
pub use line_item::{LineItem, LineItemGroup, LineItemRow, LineItems, NumberedLineItem, compute_amount};
pub use number::{DEFAULT_PAD_WIDTH, DocumentNumber, DocumentSequence, QuotationNumber};
pub use payment::{NewPayment, Payment};
pub use quotation::Quotation;
pub use status::{DocumentStatus, PaymentMode};
pub use totals::{DocumentTotals, aggregate};
