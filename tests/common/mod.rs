#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use sheetmerge::JoinConfig;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const PCB: &[&[&str]] = &[
    &[
        "WSTB", "WIDF", "WFOR", "WGES", "WPIV", "WDES", "WCOF", "WLOM", "WCMJ", "WSTKG", "EXTRA",
    ],
    &["S1", "P-100", "F1", "G1", "V1", "Desc one", "C1", "old", "5", "100", "x"],
    &["S2", "P-200", "F2", "G2", "V2", "Desc two", "C2", "old", "40", "80", "y"],
    &["S3", "P-300", "F3", "G3", "V3", "Desc three", "C3", "", "", "30", "z"],
];

pub const FB: &[&[&str]] = &[
    &["REF", "11", "12", "13"],
    &["P-100", "7", "10", "9"],
    &["P-200", "20", "25", "30"],
];

pub const ABC: &[&[&str]] = &[
    &["WKIDF", "WLOM", "WKQCO"],
    &["P-100", "l1", "q1"],
    &["P-200", "l2", "q2"],
    &["P-100", "l1b", "q1b"],
];

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// One-sheet workbook; numeric-looking cells are stored as numbers.
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

/// Input directory populated with the standard fixtures, plus a config
/// pointing at it with week 12 and the given output file name.
pub fn standard_inputs(root: &Path, output: &str) -> Result<JoinConfig> {
    let input = root.join("input");
    std::fs::create_dir_all(&input)?;
    write_sheet(&input.join("PCB.xlsx"), PCB)?;
    write_sheet(&input.join("FB.xlsx"), FB)?;
    write_sheet(&input.join("ABC.xlsx"), ABC)?;
    Ok(config_for(root, output))
}

pub fn config_for(root: &Path, output: &str) -> JoinConfig {
    JoinConfig {
        input_dir: root.join("input"),
        output: root.join(output),
        week: Some(12),
        ..JoinConfig::default()
    }
}

pub fn read_workbook(path: &Path) -> Result<Vec<Vec<Data>>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("no worksheet in {}", path.display()))??;
    Ok(range.rows().map(|r| r.to_vec()).collect())
}

pub fn text(s: &str) -> Data {
    Data::String(s.to_string())
}

pub fn input_path(root: &Path, file: &str) -> PathBuf {
    root.join("input").join(file)
}
