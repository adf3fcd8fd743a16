//! Work-order domain module (event-sourced).
//!
//! A work order tracks one unit of field work from dispatch to completion:
//! the technician travels to site, works (possibly pausing), logs materials
//! and labor while the job is active, and completes the job. Completion
//! freezes the billed items so an invoice can be generated from them.

pub mod work_order;

pub use work_order::{
    AddLineItem, CompleteWork, CreateWorkOrder, HoldWork, LaborChargeSet, LineItemAdded,
    MarkArrived, MarkInvoiced, ResumeWork, SetLaborCharge, StartTravel, StartWork,
    TechnicianArrived, TravelStarted, WorkCompleted, WorkHeld, WorkOrder, WorkOrderCommand,
    WorkOrderCreated, WorkOrderEvent, WorkOrderId, WorkOrderInvoiced, WorkOrderStatus,
    WorkResumed, WorkStarted,
};
