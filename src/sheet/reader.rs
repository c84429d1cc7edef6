use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use super::{Row, SheetError};

/// Rows of the first worksheet of an `.xlsx`/`.xls` workbook, as owned text.
///
/// The first item yielded is the header row. Rows whose cells are all empty
/// are skipped, so row counts match what a reader sees in the sheet.
pub struct SheetRows {
    path: PathBuf,
    range: Range<Data>,
    height: usize,
    width: usize,
    next: usize,
}

impl SheetRows {
    /// Open `path` (format detected from the extension) and load its first sheet.
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();
        let mut workbook = open_workbook_auto(&path).map_err(|source| SheetError::Open {
            path: path.clone(),
            source,
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SheetError::NoWorksheet(path.clone()))?
            .map_err(|source| SheetError::Read {
                path: path.clone(),
                source,
            })?;

        let (height, width) = range.get_size();
        debug!(height, width, "loaded worksheet");

        Ok(Self {
            path,
            range,
            height,
            width,
            next: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for SheetRows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        while self.next < self.height {
            let row = self.next;
            self.next += 1;
            let cells: Vec<Option<&Data>> =
                (0..self.width).map(|col| self.range.get((row, col))).collect();
            if cells.iter().all(|c| matches!(c, None | Some(Data::Empty))) {
                continue;
            }
            return Some(
                cells
                    .into_iter()
                    .map(|c| c.map(cell_text).unwrap_or_default())
                    .collect(),
            );
        }
        None
    }
}

/// Text form of a cell as the join sees it.
///
/// Numbers use their shortest round-trip form (`12`, not `12.0`), booleans
/// become `1`/`0`, dates stay as their serial number.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => String::from(if *b { "1" } else { "0" }),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        other => other.to_string(),
    }
}
