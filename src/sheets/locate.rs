use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::{error::LocateError, record::DatedRecord};

const COLUMN: &str = "A";

/// A single cell of column A, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    row: usize,
}

impl CellRange {
    pub fn new(row: usize) -> CellRange {
        CellRange { row }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COLUMN}{row}:{COLUMN}{row}", row = self.row)
    }
}

/// Picks the cell the next record goes into: the last row again when it was
/// written on the same calendar day as `now`, the row after it otherwise.
pub fn target_cell<Tz: TimeZone>(
    column: &[Vec<String>],
    now: &DateTime<Tz>,
) -> Result<CellRange, LocateError> {
    let rows = column.len();
    let last = match column.last() {
        Some(last) => last,
        None => return Ok(CellRange::new(1)),
    };

    let cell = last
        .first()
        .filter(|cell| !cell.is_empty())
        .ok_or(LocateError::EmptyCell { row: rows })?;
    let record: DatedRecord = serde_json::from_str(cell)
        .map_err(|source| LocateError::Undecodable { row: rows, source })?;
    let written = record
        .date_in(&now.timezone())
        .ok_or(LocateError::InvalidDate {
            row: rows,
            date: record.date,
        })?;

    if written == now.date_naive() {
        Ok(CellRange::new(rows))
    } else {
        Ok(CellRange::new(rows + 1))
    }
}
