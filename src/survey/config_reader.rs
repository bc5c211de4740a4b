use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::BTreeMap;

use survey_tally::catalog::{AnswerCatalog, Question, QuestionKind, Theme};
use survey_tally::{FilterConstraints, ThemeCatalog};

pub const DEFAULT_SURVEY_NAME: &str = "Core15 Survey Results";
pub const DEFAULT_FILE_PATH: &str = "Core15 D2C Survey.xlsx";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "idColumn")]
    pub id_column: Option<String>,
}

impl FileSource {
    /// The provider, guessed from the extension of the file if not given.
    pub fn provider(&self) -> String {
        match &self.provider {
            Some(p) => p.clone(),
            None if self.file_path.to_lowercase().ends_with(".csv") => "csv".to_string(),
            None => "xlsx".to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEntry {
    pub question: String,
    pub answers: Option<Vec<String>>,
    #[serde(rename = "multiSelect")]
    pub multi_select: Option<bool>,
    pub themed: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ThemeEntry {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "fileSource")]
    pub file_source: FileSource,
    pub questions: Option<Vec<QuestionEntry>>,
    pub demographics: Option<Vec<String>>,
    pub themes: Option<Vec<ThemeEntry>>,
    pub filters: Option<BTreeMap<String, Vec<String>>>,
}

impl SurveyConfig {
    /// The Core15 survey, read from the default spreadsheet.
    pub fn core15() -> SurveyConfig {
        SurveyConfig {
            output_settings: OutputSettings {
                survey_name: DEFAULT_SURVEY_NAME.to_string(),
                output_path: None,
            },
            file_source: FileSource {
                provider: None,
                file_path: DEFAULT_FILE_PATH.to_string(),
                excel_worksheet_name: None,
                id_column: None,
            },
            questions: None,
            demographics: None,
            themes: None,
            filters: None,
        }
    }
}

pub fn read_config(path: &str) -> DashResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

fn question_kind(entry: &QuestionEntry) -> DashResult<QuestionKind> {
    let multi = entry.multi_select.unwrap_or(false);
    let themed = entry.themed.unwrap_or(false);
    let res = match (&entry.answers, multi, themed) {
        (Some(_), _, true) => {
            whatever!(
                "question {:?} cannot be themed and have permitted answers",
                entry.question
            )
        }
        (None, true, true) => {
            whatever!(
                "question {:?} cannot be themed and multi-select",
                entry.question
            )
        }
        (None, false, true) => QuestionKind::ThemedFreeText,
        (Some(answers), true, false) => QuestionKind::MultiSelect(answers.clone()),
        // Every answer becomes "other".
        (None, true, false) => QuestionKind::MultiSelect(Vec::new()),
        (Some(answers), false, false) => QuestionKind::SingleSelect(answers.clone()),
        (None, false, false) => QuestionKind::FreeText,
    };
    Ok(res)
}

/// The catalog described by the configuration, or the Core15 catalog.
pub fn build_catalog(config: &SurveyConfig) -> DashResult<AnswerCatalog> {
    let catalog = match &config.questions {
        None => AnswerCatalog::core15(),
        Some(entries) => {
            let mut questions: Vec<Question> = Vec::new();
            for entry in entries.iter() {
                questions.push(Question {
                    text: entry.question.clone(),
                    kind: question_kind(entry)?,
                });
            }
            AnswerCatalog::new(
                questions,
                config.demographics.clone().unwrap_or_default(),
                None,
            )
            .context(TallySnafu {})?
        }
    };
    let catalog = match (&config.questions, &config.demographics) {
        // Only the demographics are overriden.
        (None, Some(demographics)) => {
            AnswerCatalog::new(catalog.questions().to_vec(), demographics.clone(), None)
                .context(TallySnafu {})?
                .with_id_column(AnswerCatalog::core15().id_column().map(|s| s.to_string()))
        }
        _ => catalog,
    };
    match &config.file_source.id_column {
        Some(id) => Ok(catalog.with_id_column(Some(id.clone()))),
        None => Ok(catalog),
    }
}

pub fn build_themes(config: &SurveyConfig) -> DashResult<ThemeCatalog> {
    match &config.themes {
        None => Ok(ThemeCatalog::frustrations()),
        Some(entries) => {
            let themes: Vec<Theme> = entries
                .iter()
                .map(|t| Theme {
                    name: t.name.clone(),
                    keywords: t.keywords.clone(),
                })
                .collect();
            ThemeCatalog::new(themes).context(TallySnafu {})
        }
    }
}

pub fn build_constraints(config: &SurveyConfig) -> FilterConstraints {
    let mut constraints = FilterConstraints::new();
    if let Some(filters) = &config.filters {
        for (question, values) in filters.iter() {
            constraints.insert(question, values);
        }
    }
    constraints
}

/// Parses the filters given on the command line.
///
/// They replace the filters of the configuration for the same questions.
pub fn merge_cli_filters(
    constraints: &mut FilterConstraints,
    filters: &[String],
) -> DashResult<()> {
    let mut cli: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for f in filters.iter() {
        let (question, value) = f
            .split_once('=')
            .context(InvalidFilterSnafu { filter: f.clone() })?;
        ensure!(
            !question.trim().is_empty(),
            InvalidFilterSnafu { filter: f.clone() }
        );
        cli.entry(question.trim().to_string())
            .or_default()
            .push(value.to_string());
    }
    for (question, values) in cli.iter() {
        debug!("merge_cli_filters: {:?} -> {:?}", question, values);
        constraints.replace(question, values);
    }
    Ok(())
}

pub fn read_summary(path: String) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(js: &str) -> SurveyConfig {
        serde_json::from_str(js).unwrap()
    }

    #[test]
    fn minimal_config_uses_core15() {
        let config = parse(
            r#"{"outputSettings": {"surveyName": "S"}, "fileSource": {"filePath": "a.CSV"}}"#,
        );
        assert_eq!(config.file_source.provider(), "csv");
        let catalog = build_catalog(&config).unwrap();
        assert_eq!(catalog, AnswerCatalog::core15());
        assert_eq!(build_themes(&config).unwrap(), ThemeCatalog::frustrations());
        assert!(build_constraints(&config).is_empty());
    }

    #[test]
    fn custom_catalog() {
        let config = parse(
            r#"{
            "outputSettings": {"surveyName": "S"},
            "fileSource": {"provider": "xlsx", "filePath": "a.xlsx", "idColumn": "ID"},
            "questions": [
                {"question": "Tea?", "answers": ["Yes", "No"]},
                {"question": "Which?", "answers": ["Green"], "multiSelect": true},
                {"question": "Why?", "themed": true},
                {"question": "Age?"}
            ],
            "demographics": ["Age?"],
            "themes": [{"name": "Price", "keywords": ["COST"]}],
            "filters": {"Age?": ["30"]}
        }"#,
        );
        let catalog = build_catalog(&config).unwrap();
        assert_eq!(catalog.id_column(), Some("ID"));
        assert!(matches!(catalog.kind("Which?"), QuestionKind::MultiSelect(_)));
        assert_eq!(catalog.kind("Why?"), &QuestionKind::ThemedFreeText);
        assert_eq!(catalog.kind("Age?"), &QuestionKind::FreeText);
        assert!(catalog.is_demographic("Age?"));
        let themes = build_themes(&config).unwrap();
        assert_eq!(themes.themes()[0].keywords, vec!["cost".to_string()]);
        let constraints = build_constraints(&config);
        assert_eq!(constraints.accepted("Age?").map(|s| s.len()), Some(1));
    }

    #[test]
    fn themed_question_with_answers() {
        let config = parse(
            r#"{
            "outputSettings": {"surveyName": "S"},
            "fileSource": {"filePath": "a.xlsx"},
            "questions": [{"question": "Why?", "answers": ["a"], "themed": true}]
        }"#,
        );
        assert!(build_catalog(&config).is_err());
    }

    #[test]
    fn duplicate_questions() {
        let config = parse(
            r#"{
            "outputSettings": {"surveyName": "S"},
            "fileSource": {"filePath": "a.xlsx"},
            "questions": [{"question": "Q"}, {"question": "Q"}]
        }"#,
        );
        assert!(build_catalog(&config).is_err());
    }

    #[test]
    fn cli_filters_replace_config_filters() {
        let mut constraints =
            FilterConstraints::new().accept("What is your gender?", &["Male".to_string()]);
        merge_cli_filters(
            &mut constraints,
            &[
                "What is your gender?=Female".to_string(),
                "What is your gender?=Prefer not to say".to_string(),
            ],
        )
        .unwrap();
        let accepted: Vec<&String> = constraints
            .accepted("What is your gender?")
            .unwrap()
            .iter()
            .collect();
        assert_eq!(accepted, vec!["Female", "Prefer not to say"]);
    }

    #[test]
    fn invalid_cli_filter() {
        let mut constraints = FilterConstraints::new();
        assert!(merge_cli_filters(&mut constraints, &["no equal sign".to_string()]).is_err());
        assert!(merge_cli_filters(&mut constraints, &["=x".to_string()]).is_err());
    }
}
