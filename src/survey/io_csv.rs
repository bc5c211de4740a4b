// Primitives for reading CSV files.

use crate::survey::io_common::{header_name, ParsedRow, ParsedTable};
use crate::survey::*;

pub fn read_csv_file(path: &str) -> DashResult<ParsedTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header_record = records
        .next()
        .context(EmptyCsvSnafu { path })?
        .context(CsvLineParseSnafu {})?;
    let header: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(idx, s)| header_name(idx, s))
        .collect();
    debug!("read_csv_file: header: {:?}", header);

    let mut rows: Vec<ParsedRow> = Vec::new();
    for line_r in records {
        let line = line_r.context(CsvLineParseSnafu {})?;
        // The position is reported by the reader, blank lines are skipped.
        let lineno = line
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 2);
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_file: lineno: {:?} row: {:?}", lineno, &cells);
        rows.push(ParsedRow { lineno, cells });
    }
    Ok(ParsedTable { header, rows })
}
