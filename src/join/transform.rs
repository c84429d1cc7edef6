use super::columns::{
    ResolvedColumns, ABC_VALUE, COMPARISON, FB_VALUE, MAX_VALUE, OUTPUT_WIDTH, QUANTITY,
    RECORD_ID, WANTED_COLUMNS,
};
use super::derive::{arg_max, ratio};
use super::lookup::{AbcIndex, FbIndex};
use crate::sheet::OutputCell;

/// How one wanted output column is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRule {
    /// Copy the source cell verbatim.
    Copy,
    /// Record id looked up in the key/value reference sheet.
    AbcLookup,
    /// Record id looked up in the week-labelled reference sheet.
    FbLookup,
    /// Larger of the FB lookup and the comparison column.
    ArgMax,
}

impl ColumnRule {
    pub fn for_slot(slot: usize) -> Self {
        match slot {
            ABC_VALUE => ColumnRule::AbcLookup,
            FB_VALUE => ColumnRule::FbLookup,
            MAX_VALUE => ColumnRule::ArgMax,
            _ => ColumnRule::Copy,
        }
    }
}

/// Turns one primary row into one output row of `OUTPUT_WIDTH` cells.
pub struct RowTransformer<'a> {
    columns: &'a ResolvedColumns,
    fb: &'a FbIndex,
    abc: &'a AbcIndex,
}

impl<'a> RowTransformer<'a> {
    pub fn new(columns: &'a ResolvedColumns, fb: &'a FbIndex, abc: &'a AbcIndex) -> Self {
        Self { columns, fb, abc }
    }

    pub fn transform(&self, row: &[String]) -> Vec<OutputCell> {
        let mut out: Vec<OutputCell> = Vec::with_capacity(OUTPUT_WIDTH);
        for slot in 0..WANTED_COLUMNS.len() {
            let cell: OutputCell = match ColumnRule::for_slot(slot) {
                ColumnRule::Copy => self.columns.cell(slot, row).into(),
                ColumnRule::AbcLookup => self.abc_value(row).into(),
                ColumnRule::FbLookup => self.fb_value(row).into(),
                ColumnRule::ArgMax => self.max_value(row).into(),
            };
            out.push(cell);
        }

        // Inventaire is filled in by hand downstream.
        out.push(OutputCell::Blank);
        out.push(
            ratio(self.columns.cell(QUANTITY, row), self.max_value(row))
                .map_or(OutputCell::Blank, OutputCell::Number),
        );
        out
    }

    fn record_id<'r>(&self, row: &'r [String]) -> Option<&'r str> {
        self.columns.cell(RECORD_ID, row)
    }

    fn abc_value(&self, row: &[String]) -> Option<&'a str> {
        let abc: &'a AbcIndex = self.abc;
        abc.get(self.record_id(row)?)
    }

    fn fb_value(&self, row: &[String]) -> Option<&'a str> {
        let fb: &'a FbIndex = self.fb;
        fb.get(self.record_id(row)?)
    }

    fn max_value<'r>(&self, row: &'r [String]) -> Option<&'r str>
    where
        'a: 'r,
    {
        arg_max(self.fb_value(row), self.columns.cell(COMPARISON, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::columns::ColumnSpec;
    use crate::join::lookup::LookupIndex;
    use crate::join::week::WeekSelector;
    use crate::test_support::write_sheet;
    use anyhow::Result;
    use std::path::Path;
    use tempfile::tempdir;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn wanted() -> Vec<ColumnSpec> {
        WANTED_COLUMNS.iter().map(|n| ColumnSpec::new(*n)).collect()
    }

    fn indexes(dir: &Path) -> Result<(FbIndex, AbcIndex)> {
        let fb = dir.join("FB.xlsx");
        let abc = dir.join("ABC.xlsx");
        write_sheet(&fb, &[&["REF", "11", "12"], &["P-100", "3", "10"], &["P-200", "1", "25"]])?;
        write_sheet(&abc, &[&["WKIDF", "WKQCO"], &["P-100", "q1"], &["P-200", "q2"]])?;
        Ok((
            LookupIndex::fb(fb, WeekSelector::new(12).unwrap()),
            LookupIndex::abc(abc),
        ))
    }

    #[test]
    fn rules_map_to_fixed_slots() {
        assert_eq!(ColumnRule::for_slot(0), ColumnRule::Copy);
        assert_eq!(ColumnRule::for_slot(ABC_VALUE), ColumnRule::AbcLookup);
        assert_eq!(ColumnRule::for_slot(FB_VALUE), ColumnRule::FbLookup);
        assert_eq!(ColumnRule::for_slot(MAX_VALUE), ColumnRule::ArgMax);
    }

    #[test]
    fn fills_copy_lookup_and_derived_columns() -> Result<()> {
        let dir = tempdir()?;
        let (fb, abc) = indexes(dir.path())?;
        let header = strings(&[
            "WSTKG", "WIDF", "WCMJ", "WSTB", "WLOM", "WFOR", "WGES", "WPIV", "WDES", "WCOF",
        ]);
        let columns = ResolvedColumns::resolve(&header, &wanted());
        let transformer = RowTransformer::new(&columns, &fb, &abc);

        let row = strings(&["100", "P-100", "5", "S1", "stale", "F", "G", "P", "D", "C"]);
        let out = transformer.transform(&row);

        assert_eq!(out.len(), OUTPUT_WIDTH);
        assert_eq!(out[0], OutputCell::text("S1"));
        assert_eq!(out[RECORD_ID], OutputCell::text("P-100"));
        assert_eq!(out[ABC_VALUE], OutputCell::text("q1"));
        assert_eq!(out[COMPARISON], OutputCell::text("5"));
        assert_eq!(out[QUANTITY], OutputCell::text("100"));
        assert_eq!(out[FB_VALUE], OutputCell::text("10"));
        assert_eq!(out[MAX_VALUE], OutputCell::text("10"));
        assert_eq!(out[12], OutputCell::Blank);
        assert_eq!(out[13], OutputCell::Number(10.0));
        Ok(())
    }

    #[test]
    fn short_row_and_unknown_key_leave_blanks() -> Result<()> {
        let dir = tempdir()?;
        let (fb, abc) = indexes(dir.path())?;
        let header = strings(&WANTED_COLUMNS[..10]);
        let columns = ResolvedColumns::resolve(&header, &wanted());
        let transformer = RowTransformer::new(&columns, &fb, &abc);

        let out = transformer.transform(&strings(&["S9", "P-999"]));
        assert_eq!(out.len(), OUTPUT_WIDTH);
        assert_eq!(out[0], OutputCell::text("S9"));
        assert!(out[2..].iter().all(OutputCell::is_blank));
        Ok(())
    }

    #[test]
    fn comparison_value_used_when_lookup_misses() -> Result<()> {
        let dir = tempdir()?;
        let (fb, abc) = indexes(dir.path())?;
        let header = strings(&WANTED_COLUMNS[..10]);
        let columns = ResolvedColumns::resolve(&header, &wanted());
        let transformer = RowTransformer::new(&columns, &fb, &abc);

        let row = strings(&["S", "P-404", "", "", "", "", "", "", "40", "80"]);
        let out = transformer.transform(&row);
        assert_eq!(out[FB_VALUE], OutputCell::Blank);
        assert_eq!(out[MAX_VALUE], OutputCell::text("40"));
        assert_eq!(out[13], OutputCell::Number(2.0));
        Ok(())
    }

    #[test]
    fn zero_max_leaves_ratio_blank() -> Result<()> {
        let dir = tempdir()?;
        let (fb, abc) = indexes(dir.path())?;
        let header = strings(&WANTED_COLUMNS[..10]);
        let columns = ResolvedColumns::resolve(&header, &wanted());
        let transformer = RowTransformer::new(&columns, &fb, &abc);

        let row = strings(&["S", "P-404", "", "", "", "", "", "", "0", "80"]);
        let out = transformer.transform(&row);
        assert_eq!(out[MAX_VALUE], OutputCell::text("0"));
        assert_eq!(out[13], OutputCell::Blank);
        Ok(())
    }
}
