use crate::{Event, EventEnvelope};

/// A projection builds a read model from an append-only event stream.
///
/// Projections turn events (write model) into queryable state (read model):
/// the mobile screens that display invoice balances never replay events
/// themselves, they read a projection that was fed the stream.
///
/// Projections must be **idempotent**: applying the same envelope twice must
/// produce the same read model (at-least-once delivery, replay after crash).
/// Tracking `sequence_number` per aggregate stream and skipping duplicates is
/// the usual strategy.
///
/// Read models are disposable. Events are the source of truth; a projection
/// can always be rebuilt from scratch by replaying the stream.
pub trait Projection {
    type Ev: Event;

    /// Apply a single event to the projection, updating the read model.
    ///
    /// Must be idempotent; irrelevant events should be ignored rather than
    /// rejected.
    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>);
}
