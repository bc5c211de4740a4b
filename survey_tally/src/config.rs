// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The content of one cell of the survey.
///
/// The decision between a present and a blank value is made once, when the
/// data is ingested. The rest of the pipeline never looks at the raw
/// representation of missing values again.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Cell {
    /// Some content was provided. The text is kept as it was read, untrimmed.
    Present(String),
    /// Missing, empty or only made of whitespace.
    Blank,
}

impl Cell {
    pub fn from_raw(raw: &str) -> Cell {
        if raw.trim().is_empty() {
            Cell::Blank
        } else {
            Cell::Present(raw.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Present(s) => Some(s.as_str()),
            Cell::Blank => None,
        }
    }

    /// The raw value coerced to a string. Blank cells become the empty string.
    pub fn coerced(&self) -> &str {
        self.as_str().unwrap_or("")
    }
}

/// The answers of one respondent.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResponseRow {
    /// The identifier of the respondent. It is never analyzed.
    pub id: Option<String>,
    /// One cell per question column, in the order of the columns.
    pub cells: Vec<Cell>,
}

// ******** Output data structures *********

/// The label under which all the unrecognized answers are counted.
pub const OTHER_LABEL: &str = "other";

/// The theme collecting the free-text responses that match no keyword.
pub const OVERFLOW_THEME: &str = "Other/Uncategorized";

/// The result of bucketing one raw value against the permitted answers of a question.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum NormalizedToken {
    /// A permitted answer, or the trimmed text for free-text questions.
    Answer(String),
    /// Some content that is not a permitted answer.
    Other,
    /// Nothing to count.
    Absent,
}

impl NormalizedToken {
    /// The label under which this token is counted, if it is counted at all.
    pub fn label(&self) -> Option<&str> {
        match self {
            NormalizedToken::Answer(s) => Some(s.as_str()),
            NormalizedToken::Other => Some(OTHER_LABEL),
            NormalizedToken::Absent => None,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct FrequencyRow {
    pub answer: String,
    pub count: u64,
    /// Share of the non-blank answers, rounded to one decimal place.
    pub percentage: f64,
}

/// Answers ordered by decreasing count.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct FrequencyTable {
    pub rows: Vec<FrequencyRow>,
    pub total: u64,
}

impl FrequencyTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ThemeGroup {
    pub theme: String,
    pub responses: Vec<String>,
}

/// The free-text responses of one question, grouped by theme.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ThemeReport {
    /// Non-empty groups, in the priority order of the themes. The overflow
    /// theme comes last.
    pub groups: Vec<ThemeGroup>,
    /// All the responses that were themed.
    pub responses: Vec<String>,
}

impl ThemeReport {
    pub fn total(&self) -> u64 {
        self.responses.len() as u64
    }

    /// The share of each theme over all the responses, categorized or not.
    pub fn percentages(&self) -> Vec<(String, f64)> {
        self.groups
            .iter()
            .map(|g| {
                (
                    g.theme.clone(),
                    crate::percentage(g.responses.len() as u64, self.total()),
                )
            })
            .collect()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum QuestionAnalysis {
    Frequencies(FrequencyTable),
    Themes(ThemeReport),
    /// No answer left for this question after filtering.
    NoData,
}

/// The choices offered to the user for one demographic filter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FilterDimension {
    pub question: String,
    pub options: Vec<String>,
}

/// The outcome of a full pass over the survey.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyStats {
    pub total_records: u64,
    pub filtered_records: u64,
    pub filters: Vec<FilterDimension>,
    /// The analyzed questions, in the order of the columns of the dataset.
    pub questions: Vec<(String, QuestionAnalysis)>,
}

/// Errors that prevent the survey data from being assembled.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SurveyErrors {
    DuplicateQuestion(String),
    DuplicateTheme(String),
    DuplicateColumn(String),
    RowTooWide {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Error for SurveyErrors {}

impl Display for SurveyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyErrors::DuplicateQuestion(q) => write!(f, "question declared twice: {}", q),
            SurveyErrors::DuplicateTheme(t) => write!(f, "theme declared twice: {}", t),
            SurveyErrors::DuplicateColumn(c) => write!(f, "column appears twice: {}", c),
            SurveyErrors::RowTooWide {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells but the header only has {}",
                row, found, expected
            ),
        }
    }
}

// ********* Configuration **********

/// How the answers of a question are processed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum QuestionKind {
    /// One answer per respondent, bucketed against the permitted answers.
    SingleSelect(Vec<String>),
    /// Comma-separated answers, each bucketed against the permitted answers.
    MultiSelect(Vec<String>),
    /// Open answers, counted verbatim.
    FreeText,
    /// Open answers, grouped into themes.
    ThemedFreeText,
}

impl QuestionKind {
    pub fn permitted(&self) -> Option<&[String]> {
        match self {
            QuestionKind::SingleSelect(p) | QuestionKind::MultiSelect(p) => Some(p.as_slice()),
            QuestionKind::FreeText | QuestionKind::ThemedFreeText => None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub text: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn single(text: &str, answers: &[&str]) -> Question {
        Question {
            text: text.to_string(),
            kind: QuestionKind::SingleSelect(answers.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn multi(text: &str, answers: &[&str]) -> Question {
        Question {
            text: text.to_string(),
            kind: QuestionKind::MultiSelect(answers.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn themed(text: &str) -> Question {
        Question {
            text: text.to_string(),
            kind: QuestionKind::ThemedFreeText,
        }
    }
}

/// A named bucket of free-text responses.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Theme {
    pub name: String,
    /// Lowercase keywords, matched as substrings.
    pub keywords: Vec<String>,
}

impl Theme {
    pub fn new(name: &str, keywords: &[&str]) -> Theme {
        Theme {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}
