//! Invoice balance read model.
//!
//! The mobile invoice/payment screens display totals, paid amounts and the
//! remaining balance. This projection folds the invoice event stream into
//! exactly that view, so consumers never replay events themselves.

use std::collections::HashMap;

use fieldbill_core::AggregateId;
use fieldbill_events::{EventEnvelope, Projection};

use fieldbill_billing::Money;

use crate::invoice::{InvoiceEvent, InvoiceId, InvoiceStatus};

/// Queryable balance state for one invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceBalance {
    pub invoice_id: InvoiceId,
    pub total: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
    pub status: InvoiceStatus,
}

/// Read model over `InvoiceEvent` streams.
///
/// Idempotent under at-least-once delivery: each aggregate stream's last
/// applied sequence number is tracked and stale/duplicate envelopes are
/// skipped.
#[derive(Debug, Default)]
pub struct InvoiceBalanceProjection {
    balances: HashMap<AggregateId, InvoiceBalance>,
    last_applied: HashMap<AggregateId, u64>,
}

impl InvoiceBalanceProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, invoice_id: InvoiceId) -> Option<&InvoiceBalance> {
        self.balances.get(&invoice_id.0)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    fn is_duplicate(&self, aggregate_id: AggregateId, sequence_number: u64) -> bool {
        self.last_applied
            .get(&aggregate_id)
            .is_some_and(|&last| sequence_number <= last)
    }
}

impl Projection for InvoiceBalanceProjection {
    type Ev = InvoiceEvent;

    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>) {
        let aggregate_id = envelope.aggregate_id();
        if self.is_duplicate(aggregate_id, envelope.sequence_number()) {
            return;
        }

        match envelope.payload() {
            InvoiceEvent::InvoiceGenerated(e) => {
                let status = if e.totals.total <= 0.0 {
                    InvoiceStatus::FullyPaid
                } else {
                    InvoiceStatus::Generated
                };
                self.balances.insert(
                    aggregate_id,
                    InvoiceBalance {
                        invoice_id: e.invoice_id,
                        total: e.totals.total,
                        amount_paid: 0.0,
                        balance_due: e.totals.total,
                        status,
                    },
                );
            }
            InvoiceEvent::PaymentRecorded(e) => {
                if let Some(balance) = self.balances.get_mut(&aggregate_id) {
                    balance.amount_paid = e.new_amount_paid;
                    balance.balance_due = e.new_balance_due;
                    balance.status = if e.new_balance_due <= 0.0 {
                        InvoiceStatus::FullyPaid
                    } else {
                        InvoiceStatus::PartiallyPaid
                    };
                }
            }
        }

        self.last_applied
            .insert(aggregate_id, envelope.sequence_number());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{GenerateInvoice, Invoice, InvoiceCommand, RecordPayment};
    use chrono::Utc;
    use fieldbill_billing::{LaborCharge, LineItem, LineItemKind, PaymentMethod};
    use fieldbill_core::Aggregate;
    use fieldbill_events::Event;
    use uuid::Uuid;

    fn envelope(
        aggregate_id: AggregateId,
        sequence_number: u64,
        payload: InvoiceEvent,
    ) -> EventEnvelope<InvoiceEvent> {
        EventEnvelope::new(
            Uuid::now_v7(),
            aggregate_id,
            "invoicing.invoice",
            sequence_number,
            payload,
        )
    }

    fn invoice_stream() -> (AggregateId, Vec<InvoiceEvent>) {
        let aggregate_id = AggregateId::new();
        let invoice_id = InvoiceId::new(aggregate_id);
        let mut invoice = Invoice::empty(invoice_id);
        let mut stream = Vec::new();

        let commands = vec![
            InvoiceCommand::GenerateInvoice(GenerateInvoice {
                invoice_id,
                work_order_id: fieldbill_workorders::WorkOrderId::new(AggregateId::new()),
                line_items: vec![LineItem {
                    description: "part".to_string(),
                    quantity: 2.0,
                    unit_price: 10.0,
                    kind: LineItemKind::Material,
                }],
                labor: LaborCharge {
                    hours: 2.0,
                    rate_per_hour: 25.0,
                },
                tax_rate_percent: 10.0,
                discount: 0.0,
                occurred_at: Utc::now(),
            }),
            InvoiceCommand::RecordPayment(RecordPayment {
                invoice_id,
                amount: 30.0,
                method: PaymentMethod::Cash,
                reference_number: None,
                notes: None,
                occurred_at: Utc::now(),
            }),
            InvoiceCommand::RecordPayment(RecordPayment {
                invoice_id,
                amount: 47.0,
                method: PaymentMethod::BenefitPay,
                reference_number: Some("TXN-99".to_string()),
                notes: None,
                occurred_at: Utc::now(),
            }),
        ];

        for command in &commands {
            let events = invoice.handle(command).unwrap();
            for event in &events {
                invoice.apply(event);
            }
            stream.extend(events);
        }

        (aggregate_id, stream)
    }

    #[test]
    fn replays_a_stream_into_the_expected_balance() {
        let (aggregate_id, stream) = invoice_stream();
        let invoice_id = InvoiceId::new(aggregate_id);

        let mut projection = InvoiceBalanceProjection::new();
        for (i, event) in stream.iter().enumerate() {
            projection.apply(&envelope(aggregate_id, (i + 1) as u64, event.clone()));
        }

        let balance = projection.get(invoice_id).unwrap();
        // total 77 = 20 materials + 50 labor + 7 tax; paid 30 + 47
        assert_eq!(balance.total, 77.0);
        assert_eq!(balance.amount_paid, 77.0);
        assert_eq!(balance.balance_due, 0.0);
        assert_eq!(balance.status, InvoiceStatus::FullyPaid);
    }

    #[test]
    fn duplicate_envelopes_are_skipped() {
        let (aggregate_id, stream) = invoice_stream();
        let invoice_id = InvoiceId::new(aggregate_id);

        let mut projection = InvoiceBalanceProjection::new();
        for (i, event) in stream.iter().enumerate() {
            let env = envelope(aggregate_id, (i + 1) as u64, event.clone());
            projection.apply(&env);
            // at-least-once delivery
            projection.apply(&env);
        }

        let balance = projection.get(invoice_id).unwrap();
        assert_eq!(balance.amount_paid, 77.0);
        assert_eq!(balance.status, InvoiceStatus::FullyPaid);
        assert_eq!(projection.len(), 1);
    }

    #[test]
    fn event_metadata_is_stable() {
        let (_, stream) = invoice_stream();
        assert_eq!(stream[0].event_type(), "invoicing.invoice.generated");
        assert_eq!(stream[1].event_type(), "invoicing.invoice.payment_recorded");
        assert_eq!(stream[0].version(), 1);
    }

    #[test]
    fn envelope_preserves_stream_metadata() {
        let (aggregate_id, stream) = invoice_stream();

        let env = envelope(aggregate_id, 1, stream[0].clone());
        assert!(!env.event_id().is_nil());
        assert_eq!(env.aggregate_id(), aggregate_id);
        assert_eq!(env.aggregate_type(), "invoicing.invoice");
        assert_eq!(env.sequence_number(), 1);
        assert_eq!(env.into_payload(), stream[0]);
    }
}
