//! JSON export
//!
//! Exports a reconciliation together with its report in a schema-versioned
//! envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{CamError, CamResult};
use crate::models::{Money, Reconciliation};
use crate::reports::ReconciliationReport;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub reconciliation: Reconciliation,
    pub report: ReconciliationReport,
}

impl ReconciliationExport {
    pub fn new(rec: &Reconciliation, variance_tolerance: Money) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            reconciliation: rec.clone(),
            report: ReconciliationReport::generate(rec, variance_tolerance),
        }
    }
}

/// Export a reconciliation as pretty-printed JSON
pub fn export_reconciliation_json<W: Write>(
    rec: &Reconciliation,
    variance_tolerance: Money,
    writer: &mut W,
) -> CamResult<()> {
    let export = ReconciliationExport::new(rec, variance_tolerance);
    serde_json::to_writer_pretty(&mut *writer, &export)
        .map_err(|e| CamError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| CamError::Export(e.to_string()))?;
    Ok(())
}
