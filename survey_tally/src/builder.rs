use std::collections::HashMap;

pub use crate::config::*;

static BLANK: Cell = Cell::Blank;

/// The respondents under analysis.
///
/// A collection is never modified once built. Filtering produces a new one.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Responses {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<ResponseRow>,
}

impl Responses {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The question columns, in the order of the dataset. The identifier
    /// column is not part of them.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResponseRow] {
        &self.rows
    }

    pub fn has_column(&self, question: &str) -> bool {
        self.index.contains_key(question)
    }

    /// All the cells of a question, or nothing if the question is not in the dataset.
    pub fn column<'a>(&'a self, question: &str) -> Option<impl Iterator<Item = &'a Cell> + 'a> {
        let idx = *self.index.get(question)?;
        Some(
            self.rows
                .iter()
                .map(move |r| r.cells.get(idx).unwrap_or(&BLANK)),
        )
    }

    /// The cell of a row for a question. Missing columns read as blank.
    pub fn cell<'a>(&self, row: &'a ResponseRow, question: &str) -> &'a Cell {
        self.index
            .get(question)
            .and_then(|idx| row.cells.get(*idx))
            .unwrap_or(&BLANK)
    }

    /// A collection with the same columns and a subset of the rows.
    pub(crate) fn select<F>(&self, keep: F) -> Responses
    where
        F: Fn(&ResponseRow) -> bool,
    {
        Responses {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

/// A builder for assembling the responses of a survey.
///
/// The header is the first row of the dataset. The identifier column, when
/// present, is kept apart from the questions.
///
/// ```
/// pub use survey_tally::builder::Builder;
/// # use survey_tally::SurveyErrors;
///
/// let header = vec!["ID".to_string(), "Do you like tea?".to_string()];
/// let mut builder = Builder::new(&header, Some("ID"))?;
///
/// builder.add_row_simple(&["r1".to_string(), "Yes".to_string()])?;
/// builder.add_row_simple(&["r2".to_string(), "  ".to_string()])?;
///
/// let responses = builder.build();
/// assert_eq!(responses.len(), 2);
/// assert_eq!(responses.columns(), &["Do you like tea?".to_string()]);
///
/// # Ok::<(), SurveyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _header_width: usize,
    pub(crate) _id_position: Option<usize>,
    pub(crate) _columns: Vec<String>,
    pub(crate) _rows: Vec<ResponseRow>,
}

impl Builder {
    pub fn new(header: &[String], id_column: Option<&str>) -> Result<Builder, SurveyErrors> {
        let mut columns: Vec<String> = Vec::new();
        let mut id_position: Option<usize> = None;
        for (idx, name) in header.iter().enumerate() {
            if header[..idx].contains(name) {
                return Err(SurveyErrors::DuplicateColumn(name.clone()));
            }
            if Some(name.as_str()) == id_column {
                id_position = Some(idx);
            } else {
                columns.push(name.clone());
            }
        }
        Ok(Builder {
            _header_width: header.len(),
            _id_position: id_position,
            _columns: columns,
            _rows: Vec::new(),
        })
    }

    pub fn has_id_column(&self) -> bool {
        self._id_position.is_some()
    }

    /// Adds a row of raw values, aligned with the header.
    ///
    /// Rows shorter than the header are completed with blanks.
    pub fn add_row_simple(&mut self, values: &[String]) -> Result<(), SurveyErrors> {
        self.check_width(values.len())?;
        let id = self
            ._id_position
            .and_then(|idx| values.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let cells = values
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != self._id_position)
            .map(|(_, v)| Cell::from_raw(v))
            .collect();
        self.add_row(id, cells)
    }

    /// Adds a row of cells for the question columns only.
    pub fn add_row(&mut self, id: Option<String>, mut cells: Vec<Cell>) -> Result<(), SurveyErrors> {
        if cells.len() > self._columns.len() {
            return Err(SurveyErrors::RowTooWide {
                row: self._rows.len() + 1,
                expected: self._columns.len(),
                found: cells.len(),
            });
        }
        cells.resize(self._columns.len(), Cell::Blank);
        self._rows.push(ResponseRow { id, cells });
        Ok(())
    }

    fn check_width(&self, width: usize) -> Result<(), SurveyErrors> {
        if width > self._header_width {
            Err(SurveyErrors::RowTooWide {
                row: self._rows.len() + 1,
                expected: self._header_width,
                found: width,
            })
        } else {
            Ok(())
        }
    }

    pub fn build(self) -> Responses {
        let index = self
            ._columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.clone(), idx))
            .collect();
        Responses {
            columns: self._columns,
            index,
            rows: self._rows,
        }
    }
}
