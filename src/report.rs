//! Parser for the Met Office fixed-width monthly climate reports.
//!
//! A report is a free-text blurb, a blank line, a header row
//! (`Year JAN FEB ... DEC WIN SPR SUM AUT ANN`) and one row per year. The
//! most recent year is still in progress, so its unmeasured cells are left
//! blank instead of holding a value.

use tracing::debug;

use crate::domain::{DataPoint, Month, Region, ValueType};
use crate::error::MetError;

/// Written into blank cells of the final row so they stay in their column.
pub const MISSING_MARKER: char = 'X';

pub fn parse_report(
    raw: &str,
    region: Region,
    value_type: ValueType,
) -> Result<Vec<DataPoint>, MetError> {
    let table = strip_blurb(raw)?;
    let mut lines = table
        .into_iter()
        .skip_while(|line| line.trim().is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let Some((header, rows)) = lines.split_first_mut() else {
        return Err(MetError::MalformedReport(
            "no header row after the blurb".to_string(),
        ));
    };
    let columns = HeaderColumns::parse(header)?;
    mark_missing_final_row(rows)?;

    let mut points = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        let fields = row.split_whitespace().collect::<Vec<_>>();
        let year = parse_year(fields.get(columns.year).copied(), index)?;
        for (month, column) in Month::ALL.into_iter().zip(columns.months) {
            if let Some(value) = fields.get(column).and_then(|field| parse_cell(field)) {
                points.push(DataPoint::new(region, year, month, value_type, value));
            }
        }
    }

    debug!(
        region = region.key(),
        value_type = value_type.key(),
        rows = rows.len(),
        points = points.len(),
        "parsed report"
    );
    Ok(points)
}

/// Drops every line up to and including the first blank one.
pub fn strip_blurb(raw: &str) -> Result<Vec<&str>, MetError> {
    let mut lines = raw.lines();
    if !lines.by_ref().any(|line| line.trim().is_empty()) {
        return Err(MetError::MalformedReport(
            "no blank line separates the blurb from the data table".to_string(),
        ));
    }
    Ok(lines.collect())
}

/// Marks the blank cells of the last row with [`MISSING_MARKER`].
///
/// The table is fixed-width, so a blank cell in the last row sits under a
/// number in the row above. Every space that lines up with a `.` there (the
/// decimal point, or a run of dots for an already-missing value) becomes the
/// marker, which keeps the season and annual columns from sliding left into
/// the month columns once the row is split on whitespace.
///
/// The last row must not be wider than the row above it. Rows with fewer than
/// two entries are left untouched.
pub fn mark_missing_final_row(rows: &mut [String]) -> Result<(), MetError> {
    let [.., above, last] = rows else {
        return Ok(());
    };
    let above = above.chars().collect::<Vec<_>>();
    let below = last.trim_end().chars().collect::<Vec<_>>();
    if below.len() > above.len() {
        return Err(MetError::MalformedReport(format!(
            "final row is {} characters wide but the row above it is {}",
            below.len(),
            above.len()
        )));
    }

    *last = below
        .iter()
        .zip(&above)
        .map(|(&cell, &reference)| {
            if cell == ' ' && reference == '.' {
                MISSING_MARKER
            } else {
                cell
            }
        })
        .collect();
    Ok(())
}

struct HeaderColumns {
    year: usize,
    months: [usize; 12],
}

impl HeaderColumns {
    fn parse(header: &str) -> Result<Self, MetError> {
        let names = header.split_whitespace().collect::<Vec<_>>();
        let position = |wanted: &str| {
            names
                .iter()
                .position(|name| name.eq_ignore_ascii_case(wanted))
                .ok_or_else(|| {
                    MetError::MalformedReport(format!("header has no {wanted} column: {header:?}"))
                })
        };

        let year = position("Year")?;
        let mut months = [0; 12];
        for (slot, month) in months.iter_mut().zip(Month::ALL) {
            *slot = position(month.abbrev())?;
        }
        Ok(Self { year, months })
    }
}

fn parse_year(field: Option<&str>, row: usize) -> Result<i32, MetError> {
    let field = field.ok_or_else(|| {
        MetError::MalformedReport(format!("data row {} has no year", row + 1))
    })?;
    match field.parse::<i32>() {
        Ok(year) if year > 0 => Ok(year),
        _ => Err(MetError::MalformedReport(format!(
            "data row {} has invalid year {field:?}",
            row + 1
        ))),
    }
}

fn parse_cell(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|value| value.is_finite())
}
