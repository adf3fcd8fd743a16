//! The backend's response envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fieldbill_core::{DomainError, DomainResult};

/// The single response envelope: `{ "data": ... }`.
///
/// The legacy mobile client branched on shape at every call site ("has a
/// `data` field, or is itself the array"). That reflected a loosely-typed
/// backend contract; here the envelope is one discriminated type and any
/// other shape is rejected explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// Decode a response body into the envelope's payload.
///
/// Bare arrays, a missing `data` field or type mismatches all surface as
/// `Validation`; nothing is guessed at.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> DomainResult<T> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "rejected malformed api response");
        DomainError::validation(format!("malformed api response: {e}"))
    })?;
    Ok(envelope.data)
}
