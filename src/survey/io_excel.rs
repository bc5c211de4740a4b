use calamine::DataType;

use crate::survey::io_common::{header_name, ParsedRow, ParsedTable};
use crate::survey::*;

/// Reads a workbook. Without a worksheet name, the first worksheet is used.
pub fn read_excel_file(path: &str, worksheet_name_o: Option<&str>) -> DashResult<ParsedTable> {
    debug!(
        "read_excel_file: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let wrange = match worksheet_name_o {
        Some(worksheet_name) => workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyExcelSnafu { path })?;
    let mut header: Vec<String> = Vec::new();
    for (idx, elt) in header_row.iter().enumerate() {
        header.push(header_name(idx, &read_cell(elt, 1)?));
    }
    debug!("read_excel_file: header: {:?}", header);

    let mut rows: Vec<ParsedRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        let mut cells: Vec<String> = Vec::new();
        for elt in row.iter() {
            cells.push(read_cell(elt, lineno)?);
        }
        debug!("read_excel_file: lineno: {:?} row: {:?}", lineno, &cells);
        rows.push(ParsedRow { lineno, cells });
    }
    Ok(ParsedTable { header, rows })
}

/// The text of a cell.
///
/// Whole numbers are written without decimals. Dates are written as
/// `YYYY-MM-DD HH:MM:SS`. Error cells are rejected.
fn read_cell(cell: &DataType, lineno: usize) -> DashResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            Ok((*f as i64).to_string())
        }
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(true) => Ok("True".to_string()),
        DataType::Bool(false) => Ok("False".to_string()),
        DataType::DateTime(_) => match cell.as_datetime() {
            Some(dt) => Ok(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => ExcelWrongCellTypeSnafu {
                lineno: lineno as u64,
                content: format!("{:?}", cell),
            }
            .fail(),
        },
        _ => ExcelWrongCellTypeSnafu {
            lineno: lineno as u64,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}
