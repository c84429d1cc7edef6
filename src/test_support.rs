//! Shared helpers for unit tests: log capture and workbook fixtures.

use std::path::Path;

use anyhow::Result;
use rust_xlsxwriter::Workbook;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sheetmerge=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Write a one-sheet workbook. Cells that parse as numbers are stored as
/// numbers (the way an exported database table would be); empty strings
/// leave the cell unset.
pub fn write_sheet(path: &Path, rows: &[&[&str]]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in (0u32..).zip(rows) {
        for (c, cell) in (0u16..).zip(row.iter()) {
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(n) => worksheet.write_number(r, c, n)?,
                Err(_) => worksheet.write_string(r, c, *cell)?,
            };
        }
    }
    workbook.save(path)?;
    Ok(())
}
