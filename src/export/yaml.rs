//! YAML export
//!
//! Same envelope as the JSON export, for human review.

use std::io::Write;

use crate::error::{CamError, CamResult};
use crate::export::json::ReconciliationExport;
use crate::models::{Money, Reconciliation};

/// Export a reconciliation and its report as YAML
pub fn export_reconciliation_yaml<W: Write>(
    rec: &Reconciliation,
    variance_tolerance: Money,
    writer: &mut W,
) -> CamResult<()> {
    let export = ReconciliationExport::new(rec, variance_tolerance);

    writeln!(writer, "# CAM reconciliation export")
        .map_err(|e| CamError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", export.exported_at)
        .map_err(|e| CamError::Export(e.to_string()))?;
    writeln!(writer, "# Status: {}", rec.status()).map_err(|e| CamError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| CamError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::calculated;

    #[test]
    fn test_yaml_export() {
        let rec = calculated();
        let mut buffer = Vec::new();
        export_reconciliation_yaml(&rec, Money::from_cents(1), &mut buffer).unwrap();

        let yaml = String::from_utf8(buffer).unwrap();
        assert!(yaml.starts_with("# CAM reconciliation export"));
        assert!(yaml.contains("schema_version:"));

        let parsed: ReconciliationExport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.reconciliation.items, rec.items);
    }
}
