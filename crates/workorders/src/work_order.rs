use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldbill_billing::{LaborCharge, LineItem, LineItemKind, Money, labor_total};
use fieldbill_core::{Aggregate, AggregateId, AggregateRoot, CustomerId, DomainError, TechnicianId};
use fieldbill_events::Event;

/// Work order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkOrderId(pub AggregateId);

impl WorkOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for WorkOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Work order status lifecycle.
///
/// `Pending → EnRoute → Arrived → InProgress ⇄ OnHold`, then
/// `InProgress → Completed → Invoiced`. Billing entries (line items, labor)
/// may change only while `InProgress`; completion freezes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Pending,
    EnRoute,
    Arrived,
    InProgress,
    OnHold,
    Completed,
    Invoiced,
}

/// Aggregate root: WorkOrder.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrder {
    id: WorkOrderId,
    customer_id: Option<CustomerId>,
    technician_id: Option<TechnicianId>,
    status: WorkOrderStatus,
    line_items: Vec<LineItem>,
    labor: LaborCharge,
    version: u64,
    created: bool,
}

impl WorkOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: WorkOrderId) -> Self {
        Self {
            id,
            customer_id: None,
            technician_id: None,
            status: WorkOrderStatus::Pending,
            line_items: Vec::new(),
            labor: LaborCharge::none(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> WorkOrderId {
        self.id
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn technician_id(&self) -> Option<TechnicianId> {
        self.technician_id
    }

    pub fn status(&self) -> WorkOrderStatus {
        self.status
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn labor(&self) -> LaborCharge {
        self.labor
    }

    /// Invariant: billing entries are editable only while work is active.
    pub fn is_billing_editable(&self) -> bool {
        matches!(self.status, WorkOrderStatus::InProgress)
    }

    /// Invariant: only a completed order may be invoiced.
    pub fn is_invoice_allowed(&self) -> bool {
        matches!(self.status, WorkOrderStatus::Completed)
    }
}

impl AggregateRoot for WorkOrder {
    type Id = WorkOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateWorkOrder (dispatch a job to a technician).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWorkOrder {
    pub work_order_id: WorkOrderId,
    pub customer_id: CustomerId,
    pub technician_id: TechnicianId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: StartTravel (technician heads to site).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartTravel {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkArrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkArrived {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: StartWork (clock in).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWork {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: HoldWork (pause the job, e.g. waiting on parts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldWork {
    pub work_order_id: WorkOrderId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ResumeWork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeWork {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddLineItem (log a material/service used on site).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddLineItem {
    pub work_order_id: WorkOrderId,
    pub description: String,
    pub quantity: f64,
    pub unit_price: Money,
    pub kind: LineItemKind,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetLaborCharge (hours worked at the billed rate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLaborCharge {
    pub work_order_id: WorkOrderId,
    pub hours: f64,
    pub rate_per_hour: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteWork (clock out; freezes billing entries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteWork {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkInvoiced (invoice generation happened downstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkInvoiced {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkOrderCommand {
    CreateWorkOrder(CreateWorkOrder),
    StartTravel(StartTravel),
    MarkArrived(MarkArrived),
    StartWork(StartWork),
    HoldWork(HoldWork),
    ResumeWork(ResumeWork),
    AddLineItem(AddLineItem),
    SetLaborCharge(SetLaborCharge),
    CompleteWork(CompleteWork),
    MarkInvoiced(MarkInvoiced),
}

/// Event: WorkOrderCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderCreated {
    pub work_order_id: WorkOrderId,
    pub customer_id: CustomerId,
    pub technician_id: TechnicianId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TravelStarted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelStarted {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TechnicianArrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianArrived {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkStarted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkStarted {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkHeld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHeld {
    pub work_order_id: WorkOrderId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkResumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkResumed {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineItemAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemAdded {
    pub work_order_id: WorkOrderId,
    pub line_item: LineItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LaborChargeSet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborChargeSet {
    pub work_order_id: WorkOrderId,
    pub labor: LaborCharge,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkCompleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCompleted {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkOrderInvoiced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderInvoiced {
    pub work_order_id: WorkOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkOrderEvent {
    WorkOrderCreated(WorkOrderCreated),
    TravelStarted(TravelStarted),
    TechnicianArrived(TechnicianArrived),
    WorkStarted(WorkStarted),
    WorkHeld(WorkHeld),
    WorkResumed(WorkResumed),
    LineItemAdded(LineItemAdded),
    LaborChargeSet(LaborChargeSet),
    WorkCompleted(WorkCompleted),
    WorkOrderInvoiced(WorkOrderInvoiced),
}

impl Event for WorkOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkOrderEvent::WorkOrderCreated(_) => "workorders.order.created",
            WorkOrderEvent::TravelStarted(_) => "workorders.order.travel_started",
            WorkOrderEvent::TechnicianArrived(_) => "workorders.order.arrived",
            WorkOrderEvent::WorkStarted(_) => "workorders.order.work_started",
            WorkOrderEvent::WorkHeld(_) => "workorders.order.work_held",
            WorkOrderEvent::WorkResumed(_) => "workorders.order.work_resumed",
            WorkOrderEvent::LineItemAdded(_) => "workorders.order.line_item_added",
            WorkOrderEvent::LaborChargeSet(_) => "workorders.order.labor_charge_set",
            WorkOrderEvent::WorkCompleted(_) => "workorders.order.work_completed",
            WorkOrderEvent::WorkOrderInvoiced(_) => "workorders.order.invoiced",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WorkOrderEvent::WorkOrderCreated(e) => e.occurred_at,
            WorkOrderEvent::TravelStarted(e) => e.occurred_at,
            WorkOrderEvent::TechnicianArrived(e) => e.occurred_at,
            WorkOrderEvent::WorkStarted(e) => e.occurred_at,
            WorkOrderEvent::WorkHeld(e) => e.occurred_at,
            WorkOrderEvent::WorkResumed(e) => e.occurred_at,
            WorkOrderEvent::LineItemAdded(e) => e.occurred_at,
            WorkOrderEvent::LaborChargeSet(e) => e.occurred_at,
            WorkOrderEvent::WorkCompleted(e) => e.occurred_at,
            WorkOrderEvent::WorkOrderInvoiced(e) => e.occurred_at,
        }
    }
}

impl Aggregate for WorkOrder {
    type Command = WorkOrderCommand;
    type Event = WorkOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            WorkOrderEvent::WorkOrderCreated(e) => {
                self.id = e.work_order_id;
                self.customer_id = Some(e.customer_id);
                self.technician_id = Some(e.technician_id);
                self.status = WorkOrderStatus::Pending;
                self.line_items.clear();
                self.labor = LaborCharge::none();
                self.created = true;
            }
            WorkOrderEvent::TravelStarted(_) => {
                self.status = WorkOrderStatus::EnRoute;
            }
            WorkOrderEvent::TechnicianArrived(_) => {
                self.status = WorkOrderStatus::Arrived;
            }
            WorkOrderEvent::WorkStarted(_) | WorkOrderEvent::WorkResumed(_) => {
                self.status = WorkOrderStatus::InProgress;
            }
            WorkOrderEvent::WorkHeld(_) => {
                self.status = WorkOrderStatus::OnHold;
            }
            WorkOrderEvent::LineItemAdded(e) => {
                self.line_items.push(e.line_item.clone());
            }
            WorkOrderEvent::LaborChargeSet(e) => {
                self.labor = e.labor;
            }
            WorkOrderEvent::WorkCompleted(_) => {
                self.status = WorkOrderStatus::Completed;
            }
            WorkOrderEvent::WorkOrderInvoiced(_) => {
                self.status = WorkOrderStatus::Invoiced;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            WorkOrderCommand::CreateWorkOrder(cmd) => self.handle_create(cmd),
            WorkOrderCommand::StartTravel(cmd) => self.handle_start_travel(cmd),
            WorkOrderCommand::MarkArrived(cmd) => self.handle_mark_arrived(cmd),
            WorkOrderCommand::StartWork(cmd) => self.handle_start_work(cmd),
            WorkOrderCommand::HoldWork(cmd) => self.handle_hold_work(cmd),
            WorkOrderCommand::ResumeWork(cmd) => self.handle_resume_work(cmd),
            WorkOrderCommand::AddLineItem(cmd) => self.handle_add_line_item(cmd),
            WorkOrderCommand::SetLaborCharge(cmd) => self.handle_set_labor_charge(cmd),
            WorkOrderCommand::CompleteWork(cmd) => self.handle_complete_work(cmd),
            WorkOrderCommand::MarkInvoiced(cmd) => self.handle_mark_invoiced(cmd),
        }
    }
}

impl WorkOrder {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_work_order_id(&self, work_order_id: WorkOrderId) -> Result<(), DomainError> {
        if self.id != work_order_id {
            return Err(DomainError::invariant("work_order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_status(&self, expected: WorkOrderStatus, action: &str) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::invariant(format!(
                "cannot {action} from status {:?}",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateWorkOrder) -> Result<Vec<WorkOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("work order already exists"));
        }

        Ok(vec![WorkOrderEvent::WorkOrderCreated(WorkOrderCreated {
            work_order_id: cmd.work_order_id,
            customer_id: cmd.customer_id,
            technician_id: cmd.technician_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_start_travel(&self, cmd: &StartTravel) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;
        self.ensure_status(WorkOrderStatus::Pending, "start travel")?;

        Ok(vec![WorkOrderEvent::TravelStarted(TravelStarted {
            work_order_id: cmd.work_order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_arrived(&self, cmd: &MarkArrived) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;
        self.ensure_status(WorkOrderStatus::EnRoute, "mark arrived")?;

        Ok(vec![WorkOrderEvent::TechnicianArrived(TechnicianArrived {
            work_order_id: cmd.work_order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_start_work(&self, cmd: &StartWork) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;
        self.ensure_status(WorkOrderStatus::Arrived, "start work")?;

        Ok(vec![WorkOrderEvent::WorkStarted(WorkStarted {
            work_order_id: cmd.work_order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_hold_work(&self, cmd: &HoldWork) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;
        self.ensure_status(WorkOrderStatus::InProgress, "hold work")?;

        Ok(vec![WorkOrderEvent::WorkHeld(WorkHeld {
            work_order_id: cmd.work_order_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_resume_work(&self, cmd: &ResumeWork) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;
        self.ensure_status(WorkOrderStatus::OnHold, "resume work")?;

        Ok(vec![WorkOrderEvent::WorkResumed(WorkResumed {
            work_order_id: cmd.work_order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line_item(&self, cmd: &AddLineItem) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;

        if !self.is_billing_editable() {
            return Err(DomainError::invariant(
                "line items can only be added while work is in progress",
            ));
        }

        let line_item = LineItem {
            description: cmd.description.clone(),
            quantity: cmd.quantity,
            unit_price: cmd.unit_price,
            kind: cmd.kind,
        };
        // Surfaces Validation for negative quantity/price before any event.
        line_item.line_total()?;

        Ok(vec![WorkOrderEvent::LineItemAdded(LineItemAdded {
            work_order_id: cmd.work_order_id,
            line_item,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_labor_charge(
        &self,
        cmd: &SetLaborCharge,
    ) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;

        if !self.is_billing_editable() {
            return Err(DomainError::invariant(
                "labor can only be charged while work is in progress",
            ));
        }

        let labor = LaborCharge {
            hours: cmd.hours,
            rate_per_hour: cmd.rate_per_hour,
        };
        labor_total(&labor)?;

        Ok(vec![WorkOrderEvent::LaborChargeSet(LaborChargeSet {
            work_order_id: cmd.work_order_id,
            labor,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete_work(&self, cmd: &CompleteWork) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;
        self.ensure_status(WorkOrderStatus::InProgress, "complete work")?;

        Ok(vec![WorkOrderEvent::WorkCompleted(WorkCompleted {
            work_order_id: cmd.work_order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_invoiced(&self, cmd: &MarkInvoiced) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_work_order_id(cmd.work_order_id)?;

        if !self.is_invoice_allowed() {
            return Err(DomainError::invariant(
                "only a completed work order can be invoiced",
            ));
        }

        Ok(vec![WorkOrderEvent::WorkOrderInvoiced(WorkOrderInvoiced {
            work_order_id: cmd.work_order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
