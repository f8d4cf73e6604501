//! Core data models for the payroll engine.
//!
//! This module contains the input records and the derived aggregate shapes.

mod summary;
mod work_record;
mod work_type;

pub use summary::{
    DailyTaxLine, DateGroup, DateGroupEntry, GrandTotal, WorkerSubtotal, WorkerTotals,
};
pub use work_record::{PaymentStatus, WorkRecord, WorkerRecords, coerce_decimal};
pub use work_type::{WorkType, WorkTypeMetadata};
