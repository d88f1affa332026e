pub mod charge;
pub mod input;
pub mod pipeline;
pub mod reconcile;
pub mod summary;
pub mod weight;

pub use charge::{expected_charge, Charge};
pub use input::{parse_row, ShipmentInput};
pub use pipeline::{audit_manifest, audit_table, AuditReport};
pub use reconcile::{classify, duplicate_flags, price_delta, reconcile, Review, ShipmentRow};
pub use summary::{summarize, SummaryKey, SummaryRow, TOTAL_LABEL};
pub use weight::{billable_weight, Measurements, WeightBreakdown};
