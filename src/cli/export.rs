//! CLI handler for exporting reconciliations

use clap::ValueEnum;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::config::Settings;
use crate::error::{CamError, CamResult};
use crate::export::{
    export_allocations_csv, export_categories_csv, export_reconciliation_json,
    export_reconciliation_yaml,
};
use crate::services::ReconciliationService;
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Tenant allocations as CSV
    Csv,
    /// Record and report, schema-versioned
    Json,
    /// Record and report, human-readable
    Yaml,
}

/// Write a reconciliation to `output`
pub fn handle_export(
    storage: &Storage,
    settings: &Settings,
    identifier: &str,
    output: PathBuf,
    format: ExportFormat,
    categories: bool,
) -> CamResult<()> {
    let service = ReconciliationService::new(storage);
    let rec = service.find(identifier)?;

    if !rec.is_finalized {
        log::warn!("Exporting draft reconciliation {}", rec.id);
    }

    let file = File::create(&output).map_err(|e| {
        CamError::Export(format!("Failed to create {}: {}", output.display(), e))
    })?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv if categories => export_categories_csv(&rec, &mut writer)?,
        ExportFormat::Csv => export_allocations_csv(&rec, &mut writer)?,
        ExportFormat::Json => {
            export_reconciliation_json(&rec, settings.variance_tolerance, &mut writer)?
        }
        ExportFormat::Yaml => {
            export_reconciliation_yaml(&rec, settings.variance_tolerance, &mut writer)?
        }
    }
    writer
        .flush()
        .map_err(|e| CamError::Export(format!("Failed to write {}: {}", output.display(), e)))?;

    println!("Exported {} to {}", rec.id, output.display());
    Ok(())
}
