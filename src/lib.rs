//! Freight tariff computation and reconciliation.
//!
//! Reads a carrier shipment manifest, recomputes the charge each shipment
//! should have carried under a weight-bracket by zone tariff, and reports
//! where the billed price disagrees.

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod table;
pub mod tariff;

pub use engine::{audit_manifest, audit_table, AuditReport};
pub use error::{AuditError, SchemaError};
pub use tariff::TariffSchedule;
