// src/sheet/mod.rs
//! Boundary to the spreadsheet codec: reading the first worksheet of a
//! workbook as text rows, and writing output rows to `.xlsx` or `.csv`.

pub mod reader;
pub mod writer;

use std::path::PathBuf;

use thiserror::Error;

pub use reader::{cell_text, SheetRows};
pub use writer::{open_sink, CsvSink, RowSink, XlsxSink};

/// One source row, positionally aligned to its sheet's header.
/// An empty string means the cell is missing.
pub type Row = Vec<String>;

/// A single output cell. Derived ratios are numeric; everything else is text.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    Blank,
    Text(String),
    Number(f64),
}

impl OutputCell {
    pub fn text(value: impl Into<String>) -> Self {
        OutputCell::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, OutputCell::Blank)
    }
}

impl From<Option<&str>> for OutputCell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(OutputCell::Blank, OutputCell::text)
    }
}

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("cannot open workbook {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} has no worksheet", .0.display())]
    NoWorksheet(PathBuf),

    #[error("cannot read first worksheet of {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("output exceeds the worksheet limit at row {0}")]
    TooManyRows(usize),
}
