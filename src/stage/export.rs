// src/stage/export.rs
//! Regenerates the input sheets from the SQLite database: one workbook per
//! table, header row of column names, one row per record.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use rusqlite::{types::ValueRef, Connection, OpenFlags, OptionalExtension};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::{info, instrument};

use super::Stage;

/// Tables exported by default and the file each one becomes.
pub const DEFAULT_TABLES: [(&str, &str); 3] =
    [("abc", "ABC.xlsx"), ("fb", "FB.xlsx"), ("pcb", "PCB.xlsx")];

pub struct SqliteExportStage {
    database: PathBuf,
    output_dir: PathBuf,
    tables: Vec<(String, String)>,
}

impl SqliteExportStage {
    pub fn new(database: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            output_dir: output_dir.into(),
            tables: DEFAULT_TABLES
                .iter()
                .map(|(t, f)| (t.to_string(), f.to_string()))
                .collect(),
        }
    }

    /// Export every table that exists; returns how many were written.
    #[instrument(level = "info", skip(self), fields(db = %self.database.display()))]
    pub fn export(&self) -> Result<usize> {
        if !self.database.is_file() {
            bail!("database not found: {}", self.database.display());
        }
        let conn = Connection::open_with_flags(&self.database, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("opening {}", self.database.display()))?;
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let mut written = 0;
        for (table, file) in &self.tables {
            if !table_exists(&conn, table)? {
                info!(%table, "table not found, skipping");
                continue;
            }
            let path = self.output_dir.join(file);
            let rows = export_table(&conn, table, &path)
                .with_context(|| format!("exporting table {table}"))?;
            info!(%table, rows, path = %path.display(), "exported table");
            written += 1;
        }
        Ok(written)
    }
}

impl Stage for SqliteExportStage {
    fn name(&self) -> &str {
        "export"
    }

    fn run(&mut self) -> Result<()> {
        self.export().map(|_| ())
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn export_table(conn: &Connection, table: &str, path: &Path) -> Result<u32> {
    let sql = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
    let mut stmt = conn.prepare(&sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut worksheet = Worksheet::new();
    worksheet.set_name(table)?;
    for (col, name) in (0u16..).zip(&names) {
        worksheet.write_string(0, col, name.as_str())?;
    }

    let mut rows = stmt.query([])?;
    let mut row_num: u32 = 0;
    while let Some(row) = rows.next()? {
        row_num += 1;
        for (idx, col) in (0..names.len()).zip(0u16..) {
            match row.get_ref(idx)? {
                ValueRef::Null => {}
                ValueRef::Integer(i) => {
                    worksheet.write_number(row_num, col, i as f64)?;
                }
                ValueRef::Real(f) => {
                    worksheet.write_number(row_num, col, f)?;
                }
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                    worksheet.write_string(row_num, col, String::from_utf8_lossy(bytes))?;
                }
            }
        }
    }

    let mut workbook = Workbook::new();
    workbook.push_worksheet(worksheet);
    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    Ok(row_num)
}
