use std::path::Path;

/// A row of raw values, as read from the input file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedRow {
    /// The line in the original file, starting at 1 for the header.
    pub lineno: usize,
    pub cells: Vec<String>,
}

/// The content of an input file, before validation.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParsedTable {
    pub header: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Respondents without an identifier get one made from the file name and the line.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// The name of a column. Columns without a name are named after their position.
pub fn header_name(idx: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        raw.to_string()
    }
}
