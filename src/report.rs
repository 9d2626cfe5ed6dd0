//! Yearly rollup of period ledgers and CSV export

use std::io::Write;

use crate::allocation::PERIODS_PER_YEAR;
use crate::error::ConfigError;
use crate::projection::{PeriodRow, YearRow};

/// Group consecutive period rows into years of up to 12 periods.
///
/// The final group is emitted even when short (e.g. a corpus depleted
/// mid-year); it is never dropped or merged into its neighbour.
pub fn rollup(rows: &[PeriodRow]) -> Vec<YearRow> {
    rows.chunks(PERIODS_PER_YEAR as usize)
        .enumerate()
        .map(|(index, block)| YearRow {
            year: index as u32 + 1,
            periods: block.len() as u32,
            total_scheduled: block.iter().map(|r| r.scheduled_amount).sum(),
            total_amount: block.iter().map(|r| r.actual_amount).sum(),
            total_return: block.iter().map(|r| r.return_earned).sum(),
            ending_balance: block.last().map(|r| r.ending_balance).unwrap_or(0.0),
        })
        .collect()
}

/// Write period rows as CSV, rounding to `decimals` places
pub fn write_period_csv<W: Write>(
    writer: W,
    rows: &[PeriodRow],
    decimals: u32,
) -> Result<(), ConfigError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row.rounded(decimals))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write yearly rows as CSV, rounding to `decimals` places
pub fn write_yearly_csv<W: Write>(
    writer: W,
    rows: &[YearRow],
    decimals: u32,
) -> Result<(), ConfigError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row.rounded(decimals))?;
    }
    csv_writer.flush()?;
    Ok(())
}
