use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::debug;

use super::{OutputCell, SheetError};

/// Destination for output rows, written in order as they are produced.
pub trait RowSink {
    fn write_header(&mut self, labels: &[&str]) -> Result<(), SheetError>;
    fn write_row(&mut self, cells: &[OutputCell]) -> Result<(), SheetError>;
    /// Flush and close. Nothing is guaranteed on disk for `.xlsx` until this returns.
    fn finish(self: Box<Self>) -> Result<(), SheetError>;
}

/// Pick a sink from the output path: `.csv` gets a streaming CSV writer,
/// anything else an `.xlsx` workbook.
pub fn open_sink(path: &Path) -> Result<Box<dyn RowSink>, SheetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let is_csv = path
        .extension()
        .and_then(|s| s.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(Box::new(CsvSink::create(path)?))
    } else {
        Ok(Box::new(XlsxSink::create(path)?))
    }
}

/// Builds one worksheet in memory and saves the workbook on `finish`.
/// `create` removes any previous file at the path, so a run that never
/// reaches `finish` leaves nothing behind.
pub struct XlsxSink {
    path: PathBuf,
    worksheet: Worksheet,
    next_row: usize,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            worksheet: Worksheet::new(),
            next_row: 0,
        }
    }

    pub fn create(path: impl Into<PathBuf>) -> Result<Self, SheetError> {
        let sink = Self::new(path);
        match fs::remove_file(&sink.path) {
            Ok(()) => debug!(path = %sink.path.display(), "removed previous output"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(sink)
    }

    fn row_num(&self) -> Result<u32, SheetError> {
        u32::try_from(self.next_row).map_err(|_| SheetError::TooManyRows(self.next_row))
    }
}

impl RowSink for XlsxSink {
    fn write_header(&mut self, labels: &[&str]) -> Result<(), SheetError> {
        let row = self.row_num()?;
        for (col, label) in (0u16..).zip(labels) {
            self.worksheet.write_string(row, col, *label)?;
        }
        self.next_row += 1;
        Ok(())
    }

    fn write_row(&mut self, cells: &[OutputCell]) -> Result<(), SheetError> {
        let row = self.row_num()?;
        for (col, cell) in (0u16..).zip(cells) {
            match cell {
                OutputCell::Blank => {}
                OutputCell::Text(text) => {
                    self.worksheet.write_string(row, col, text.as_str())?;
                }
                OutputCell::Number(n) => {
                    self.worksheet.write_number(row, col, *n)?;
                }
            }
        }
        self.next_row += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<(), SheetError> {
        let XlsxSink {
            path,
            worksheet,
            next_row,
        } = *self;
        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        workbook.save(&path)?;
        debug!(rows = next_row, path = %path.display(), "saved workbook");
        Ok(())
    }
}

/// Writes each row straight through to disk, so a run that fails midway
/// leaves the rows already processed in place.
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self, SheetError> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
        })
    }
}

impl RowSink for CsvSink {
    fn write_header(&mut self, labels: &[&str]) -> Result<(), SheetError> {
        self.writer.write_record(labels)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_row(&mut self, cells: &[OutputCell]) -> Result<(), SheetError> {
        let record: Vec<String> = cells
            .iter()
            .map(|cell| match cell {
                OutputCell::Blank => String::new(),
                OutputCell::Text(text) => text.clone(),
                OutputCell::Number(n) => n.to_string(),
            })
            .collect();
        self.writer.write_record(&record)?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<(), SheetError> {
        self.writer.flush()?;
        Ok(())
    }
}
