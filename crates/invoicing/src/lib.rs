//! Invoicing domain module (event-sourced).
//!
//! An invoice is generated once per completed work order: generation freezes
//! the billed items and fixes the totals, then payments are appended until
//! the balance reaches zero. All business rules are deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod balance;
pub mod invoice;

pub use balance::{InvoiceBalance, InvoiceBalanceProjection};
pub use invoice::{
    GenerateInvoice, Invoice, InvoiceCommand, InvoiceEvent, InvoiceGenerated, InvoiceId,
    InvoiceStatus, PaymentRecorded, RecordPayment,
};
