use super::{ComparisonTable, Line};
use crate::Result;
use rust_xlsxwriter::{Color, DocProperties, Format, FormatAlign, Workbook, Worksheet};
use std::io::Write;

/// Write the comparison as a single-sheet workbook.
///
/// The first table row is treated as the header and frozen together with the label column.
/// Cells holding plain numbers are written as numbers so they can be charted directly.
#[expect(unused_results, reason = "rust_xlsxwriter methods return &mut Worksheet for chaining")]
pub fn generate<W: Write>(table: &ComparisonTable, sheet_name: &str, writer: &mut W) -> Result<()> {
    let mut workbook = Workbook::new();

    let properties = DocProperties::new().set_author("ai-impact");
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet().set_name(sheet_name)?;

    let title_format = Format::new().set_bold().set_font_size(14);
    let heading_format = Format::new().set_bold();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x00FE_D7AA))
        .set_align(FormatAlign::Center);
    let label_format = Format::new().set_bold().set_align(FormatAlign::Left);
    let value_format = Format::new().set_align(FormatAlign::Right);

    let mut header_row = None;

    for (row, line) in (0_u32..).zip(table.lines()) {
        match line {
            Line::Text(text) if text.is_empty() => {}
            Line::Text(text) => {
                let format = if row == 0 {
                    &title_format
                } else if is_heading(text) {
                    &heading_format
                } else {
                    worksheet.write_string(row, 0, text)?;
                    continue;
                };
                worksheet.write_string_with_format(row, 0, text, format)?;
            }
            Line::Row(cells) if header_row.is_none() => {
                header_row = Some(row);
                for (col, cell) in (0_u16..).zip(cells) {
                    worksheet.write_string_with_format(row, col, cell, &header_format)?;
                }
            }
            Line::Row(cells) => {
                let mut cells = (0_u16..).zip(cells);
                if let Some((col, label)) = cells.next() {
                    worksheet.write_string_with_format(row, col, label, &label_format)?;
                }
                for (col, cell) in cells {
                    write_cell(worksheet, row, col, cell, &value_format)?;
                }
            }
        }
    }

    if let Some(row) = header_row {
        worksheet.set_freeze_panes(row + 1, 1)?;
    }

    worksheet.autofit();

    let data = workbook.save_to_buffer()?;
    writer.write_all(&data)?;

    Ok(())
}

#[expect(unused_results, reason = "rust_xlsxwriter methods return &mut Worksheet for chaining")]
fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &str, format: &Format) -> Result<()> {
    if let Ok(number) = cell.parse::<f64>() {
        worksheet.write_number_with_format(row, col, number, format)?;
    } else {
        worksheet.write_string_with_format(row, col, cell, format)?;
    }
    Ok(())
}

/// Section titles such as `Key Changes:` end with a colon and are not bullet points.
fn is_heading(text: &str) -> bool {
    text.ends_with(':') && !text.starts_with('•')
}
