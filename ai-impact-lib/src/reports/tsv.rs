use super::{ComparisonTable, Line};
use crate::Result;
use core::fmt::Write;

/// Write the table as tab-separated values, ready to paste into a spreadsheet.
///
/// Tabs and line breaks inside cells would shift the columns, so they are replaced by spaces.
pub fn generate<W: Write>(table: &ComparisonTable, writer: &mut W) -> Result<()> {
    for line in table.lines() {
        match line {
            Line::Text(text) => writeln!(writer, "{text}")?,
            Line::Row(cells) => {
                for (i, cell) in cells.iter().enumerate() {
                    if i > 0 {
                        write!(writer, "\t")?;
                    }
                    write!(writer, "{}", sanitize(cell))?;
                }
                writeln!(writer)?;
            }
        }
    }

    Ok(())
}

fn sanitize(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}
