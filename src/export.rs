//! CSV export
//!
//! Writes one target's records to a CSV file: a header row of column titles,
//! then one row per record in field order. Parent directories are created on
//! demand.

use crate::error::{ExportError, Result};
use crate::extraction::PlayerRecord;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Ordered field-name to column-title mapping
pub type ExportHeader = [(String, String)];

/// Destination for a target's finished record set
pub trait RecordExporter {
    /// Persist `records` at `destination` using `header` for column order and titles
    fn export(&self, destination: &Path, header: &ExportHeader, records: &[PlayerRecord]) -> Result<()>;
}

/// CSV file exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Write CSV to any writer
    pub fn write_to<W: std::io::Write>(
        writer: W,
        header: &ExportHeader,
        records: &[PlayerRecord],
    ) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(header.iter().map(|(_, title)| title.as_str()))
            .map_err(ExportError::from)?;

        for record in records {
            let row = header
                .iter()
                .map(|(field, _)| {
                    record
                        .get(field)
                        .ok_or_else(|| ExportError::UnknownField(field.clone()))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            csv.write_record(row).map_err(ExportError::from)?;
        }

        csv.flush()?;
        Ok(())
    }
}

impl RecordExporter for CsvExporter {
    #[instrument(skip(self, header, records), fields(records = records.len()))]
    fn export(&self, destination: &Path, header: &ExportHeader, records: &[PlayerRecord]) -> Result<()> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("Created folder: {}", parent.display());
            }
        }

        let file = fs::File::create(destination)?;
        Self::write_to(file, header, records)?;
        info!("Exported {} records to {}", records.len(), destination.display());
        Ok(())
    }
}
