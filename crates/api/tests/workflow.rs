//! End-to-end workflow: decode backend payloads, execute a work order in the
//! field, generate the invoice and reconcile payments.

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use fieldbill_api::{CurrencyDto, LineItemDto, PaymentDto, decode_envelope};
use fieldbill_billing::{Currency, LineItem, Payment, format_money};
use fieldbill_core::{Aggregate, AggregateId, CustomerId, TechnicianId};
use fieldbill_events::{EventEnvelope, Projection};
use fieldbill_invoicing::{
    GenerateInvoice, Invoice, InvoiceBalanceProjection, InvoiceCommand, InvoiceEvent, InvoiceId,
    InvoiceStatus, RecordPayment,
};
use fieldbill_workorders::{
    AddLineItem, CompleteWork, CreateWorkOrder, MarkArrived, MarkInvoiced, SetLaborCharge,
    StartTravel, StartWork, WorkOrder, WorkOrderCommand, WorkOrderId, WorkOrderStatus,
};

const LINE_ITEMS_BODY: &str = r#"{"data":[
    {"description":"AC filter","quantity":2,"unitPrice":10,"itemType":"material"},
    {"description":"Coil cleaning","quantity":1,"unitPrice":5,"itemType":"service"}
]}"#;

const PAYMENTS_BODY: &str = r#"{"data":[
    {"amount":30.0,"paymentMethod":"CASH","referenceNumber":null,"notes":null,
     "recordedAt":"2026-08-30T10:00:00Z"},
    {"amount":30.0,"paymentMethod":"CARD","referenceNumber":null,"notes":null,
     "recordedAt":"2026-08-30T11:00:00Z"},
    {"amount":22.5,"paymentMethod":"BENEFIT_PAY","referenceNumber":"TXN-77","notes":null,
     "recordedAt":"2026-08-30T12:00:00Z"}
]}"#;

const CURRENCY_BODY: &str = r#"{"data":
    {"symbol":"BD","symbolPosition":"before","decimalPlaces":3,"isDefault":true}
}"#;

fn run_work_order(order: &mut WorkOrder, cmd: WorkOrderCommand) -> Result<()> {
    let events = order.handle(&cmd)?;
    for event in &events {
        order.apply(event);
    }
    Ok(())
}

fn run_invoice(invoice: &mut Invoice, cmd: InvoiceCommand) -> Result<Vec<InvoiceEvent>> {
    let events = invoice.handle(&cmd)?;
    for event in &events {
        invoice.apply(event);
    }
    Ok(events)
}

#[test]
fn field_job_from_dispatch_to_settled_invoice() -> Result<()> {
    fieldbill_observability::init();

    let item_dtos: Vec<LineItemDto> = decode_envelope(LINE_ITEMS_BODY)?;
    let items: Vec<LineItem> = item_dtos
        .into_iter()
        .map(LineItem::try_from)
        .collect::<Result<_, _>>()?;
    let payment_dtos: Vec<PaymentDto> = decode_envelope(PAYMENTS_BODY)?;
    let payments: Vec<Payment> = payment_dtos
        .into_iter()
        .map(Payment::try_from)
        .collect::<Result<_, _>>()?;
    let currency: Currency = Currency::try_from(decode_envelope::<CurrencyDto>(CURRENCY_BODY)?)?;

    // Technician executes the job.
    let work_order_id = WorkOrderId::new(AggregateId::new());
    let mut order = WorkOrder::empty(work_order_id);
    run_work_order(
        &mut order,
        WorkOrderCommand::CreateWorkOrder(CreateWorkOrder {
            work_order_id,
            customer_id: CustomerId::new(),
            technician_id: TechnicianId::new(),
            occurred_at: Utc::now(),
        }),
    )?;
    run_work_order(
        &mut order,
        WorkOrderCommand::StartTravel(StartTravel {
            work_order_id,
            occurred_at: Utc::now(),
        }),
    )?;
    run_work_order(
        &mut order,
        WorkOrderCommand::MarkArrived(MarkArrived {
            work_order_id,
            occurred_at: Utc::now(),
        }),
    )?;
    run_work_order(
        &mut order,
        WorkOrderCommand::StartWork(StartWork {
            work_order_id,
            occurred_at: Utc::now(),
        }),
    )?;
    for item in &items {
        run_work_order(
            &mut order,
            WorkOrderCommand::AddLineItem(AddLineItem {
                work_order_id,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                kind: item.kind,
                occurred_at: Utc::now(),
            }),
        )?;
    }
    run_work_order(
        &mut order,
        WorkOrderCommand::SetLaborCharge(SetLaborCharge {
            work_order_id,
            hours: 2.0,
            rate_per_hour: 25.0,
            occurred_at: Utc::now(),
        }),
    )?;
    run_work_order(
        &mut order,
        WorkOrderCommand::CompleteWork(CompleteWork {
            work_order_id,
            occurred_at: Utc::now(),
        }),
    )?;
    assert!(order.is_invoice_allowed());

    // Generation freezes the completed order's billing.
    let invoice_aggregate_id = AggregateId::new();
    let invoice_id = InvoiceId::new(invoice_aggregate_id);
    let mut invoice = Invoice::empty(invoice_id);
    let mut stream = run_invoice(
        &mut invoice,
        InvoiceCommand::GenerateInvoice(GenerateInvoice {
            invoice_id,
            work_order_id,
            line_items: order.line_items().to_vec(),
            labor: order.labor(),
            tax_rate_percent: 10.0,
            discount: 0.0,
            occurred_at: Utc::now(),
        }),
    )?;
    run_work_order(
        &mut order,
        WorkOrderCommand::MarkInvoiced(MarkInvoiced {
            work_order_id,
            occurred_at: Utc::now(),
        }),
    )?;
    assert_eq!(order.status(), WorkOrderStatus::Invoiced);

    let totals = *invoice.totals().expect("generated invoice has totals");
    assert_eq!(totals.materials_subtotal, 25.0);
    assert_eq!(totals.labor_total, 50.0);
    assert_eq!(totals.total, 82.5);
    assert_eq!(format_money(totals.total, &currency), "BD 82.500");

    // Payments land one by one, in wire order.
    for payment in &payments {
        stream.extend(run_invoice(
            &mut invoice,
            InvoiceCommand::RecordPayment(RecordPayment {
                invoice_id,
                amount: payment.amount,
                method: payment.method,
                reference_number: payment.reference_number.clone(),
                notes: payment.notes.clone(),
                occurred_at: payment.recorded_at,
            }),
        )?);
    }

    assert_eq!(invoice.status(), InvoiceStatus::FullyPaid);
    assert_eq!(invoice.amount_paid(), 82.5);
    assert_eq!(invoice.balance_due(), 0.0);
    assert_eq!(format_money(invoice.balance_due(), &currency), "BD 0.000");

    // The balance read model converges on the same view.
    let mut projection = InvoiceBalanceProjection::new();
    for (i, event) in stream.iter().enumerate() {
        projection.apply(&EventEnvelope::new(
            Uuid::now_v7(),
            invoice_aggregate_id,
            "invoicing.invoice",
            (i + 1) as u64,
            event.clone(),
        ));
    }
    let balance = projection
        .get(invoice_id)
        .expect("projection tracks the invoice");
    assert_eq!(balance.total, 82.5);
    assert_eq!(balance.amount_paid, 82.5);
    assert_eq!(balance.status, InvoiceStatus::FullyPaid);

    Ok(())
}

#[test]
fn malformed_backend_response_never_reaches_the_domain() {
    fieldbill_observability::init();

    let bare_array = r#"[{"description":"x","quantity":1,"unitPrice":1,"itemType":null}]"#;
    assert!(decode_envelope::<Vec<LineItemDto>>(bare_array).is_err());
}
