use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldbill_billing::{
    InvoiceTotals, LaborCharge, LineItem, Money, Payment, PaymentMethod, aggregate_payments,
    balance_due, invoice_totals, is_fully_paid, labor_total, materials_subtotal,
    validate_payment_submission,
};
use fieldbill_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use fieldbill_events::Event;
use fieldbill_workorders::WorkOrderId;

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Payment-progress lifecycle of an invoice.
///
/// `Draft` (no totals fixed) → `Generated` (totals fixed, no payments) →
/// `PartiallyPaid` → `FullyPaid` (terminal). Payments are append-only; there
/// is no transition that removes a payment or reopens a fully paid invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Generated,
    PartiallyPaid,
    FullyPaid,
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    id: InvoiceId,
    work_order_id: Option<WorkOrderId>,
    status: InvoiceStatus,
    line_items: Vec<LineItem>,
    labor: LaborCharge,
    totals: Option<InvoiceTotals>,
    payments: Vec<Payment>,
    amount_paid: Money,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-generated aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            work_order_id: None,
            status: InvoiceStatus::Draft,
            line_items: Vec::new(),
            labor: LaborCharge::none(),
            totals: None,
            payments: Vec::new(),
            amount_paid: 0.0,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn work_order_id(&self) -> Option<WorkOrderId> {
        self.work_order_id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn labor(&self) -> LaborCharge {
        self.labor
    }

    /// Fixed amounts, present once the invoice has been generated.
    pub fn totals(&self) -> Option<&InvoiceTotals> {
        self.totals.as_ref()
    }

    /// Chronological, append-only payment sequence.
    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn amount_paid(&self) -> Money {
        self.amount_paid
    }

    /// Remaining unpaid amount, floored at zero. Zero for a draft.
    pub fn balance_due(&self) -> Money {
        match &self.totals {
            Some(totals) => balance_due(totals.total, self.amount_paid),
            None => 0.0,
        }
    }

    /// Invariant: fully paid invoices accept no further payments.
    pub fn can_accept_payment(&self) -> bool {
        self.created && self.status != InvoiceStatus::FullyPaid
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: GenerateInvoice (freeze a completed work order's billing into
/// fixed totals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateInvoice {
    pub invoice_id: InvoiceId,
    pub work_order_id: WorkOrderId,
    pub line_items: Vec<LineItem>,
    pub labor: LaborCharge,
    pub tax_rate_percent: f64,
    pub discount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    GenerateInvoice(GenerateInvoice),
    RecordPayment(RecordPayment),
}

/// Event: InvoiceGenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceGenerated {
    pub invoice_id: InvoiceId,
    pub work_order_id: WorkOrderId,
    pub line_items: Vec<LineItem>,
    pub labor: LaborCharge,
    pub totals: InvoiceTotals,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub invoice_id: InvoiceId,
    pub payment: Payment,
    pub new_amount_paid: Money,
    pub new_balance_due: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceGenerated(InvoiceGenerated),
    PaymentRecorded(PaymentRecorded),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceGenerated(_) => "invoicing.invoice.generated",
            InvoiceEvent::PaymentRecorded(_) => "invoicing.invoice.payment_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceGenerated(e) => e.occurred_at,
            InvoiceEvent::PaymentRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceGenerated(e) => {
                self.id = e.invoice_id;
                self.work_order_id = Some(e.work_order_id);
                self.line_items = e.line_items.clone();
                self.labor = e.labor;
                self.totals = Some(e.totals);
                self.payments.clear();
                self.amount_paid = 0.0;
                // A clamped-to-zero total is settled the moment it is fixed.
                self.status = if is_fully_paid(e.totals.total, 0.0) {
                    InvoiceStatus::FullyPaid
                } else {
                    InvoiceStatus::Generated
                };
                self.created = true;
            }
            InvoiceEvent::PaymentRecorded(e) => {
                self.payments.push(e.payment.clone());
                self.amount_paid = e.new_amount_paid;
                if let Some(totals) = &self.totals {
                    self.status = if is_fully_paid(totals.total, self.amount_paid) {
                        InvoiceStatus::FullyPaid
                    } else {
                        InvoiceStatus::PartiallyPaid
                    };
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::GenerateInvoice(cmd) => self.handle_generate(cmd),
            InvoiceCommand::RecordPayment(cmd) => self.handle_record_payment(cmd),
        }
    }
}

impl Invoice {
    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_generate(&self, cmd: &GenerateInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already generated"));
        }

        let materials = materials_subtotal(&cmd.line_items)?;
        let labor = labor_total(&cmd.labor)?;
        let totals = invoice_totals(materials, labor, cmd.tax_rate_percent, cmd.discount)?;

        Ok(vec![InvoiceEvent::InvoiceGenerated(InvoiceGenerated {
            invoice_id: cmd.invoice_id,
            work_order_id: cmd.work_order_id,
            line_items: cmd.line_items.clone(),
            labor: cmd.labor,
            totals,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_payment(&self, cmd: &RecordPayment) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        if !self.can_accept_payment() {
            return Err(DomainError::invariant(
                "cannot record payment on a fully paid invoice",
            ));
        }

        validate_payment_submission(
            cmd.method,
            cmd.amount,
            cmd.reference_number.as_deref(),
            self.balance_due(),
        )?;

        let payment = Payment {
            amount: cmd.amount,
            method: cmd.method,
            reference_number: cmd.reference_number.clone(),
            notes: cmd.notes.clone(),
            recorded_at: cmd.occurred_at,
        };

        // Re-aggregate over the appended sequence; this is the only way the
        // paid amount ever moves.
        let mut payments = self.payments.clone();
        payments.push(payment.clone());
        let new_amount_paid = aggregate_payments(&payments)?;
        let total = self
            .totals
            .as_ref()
            .ok_or_else(|| DomainError::invariant("invoice has no fixed totals"))?
            .total;
        let new_balance_due = balance_due(total, new_amount_paid);

        Ok(vec![InvoiceEvent::PaymentRecorded(PaymentRecorded {
            invoice_id: cmd.invoice_id,
            payment,
            new_amount_paid,
            new_balance_due,
            occurred_at: cmd.occurred_at,
        })])
    }
}
