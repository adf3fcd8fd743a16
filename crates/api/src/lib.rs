//! `fieldbill-api` — typed decoding of the backend's JSON payloads.
//!
//! The remote work-order/invoice/payment service is an external collaborator;
//! this crate owns the boundary: one explicit response envelope, camelCase
//! DTOs mirroring the wire, and validated conversion into domain types.

pub mod dto;
pub mod envelope;

pub use dto::{CurrencyDto, LineItemDto, PaymentDto};
pub use envelope::{ApiEnvelope, decode_envelope};
