//! Export of calculated reconciliations
//!
//! - CSV: tenant allocations and category breakdown (spreadsheet-compatible)
//! - JSON: schema-versioned envelope with the record and its report
//! - YAML: the same envelope, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_allocations_csv, export_categories_csv};
pub use json::{export_reconciliation_json, ReconciliationExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_reconciliation_yaml;
