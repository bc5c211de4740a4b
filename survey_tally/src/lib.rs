/*!
Normalization, frequency tables and free-text theming for survey responses.

The entry point is [`run_survey_stats`], which runs one full pass over the
responses of a survey: demographic filtering, then one analysis per question.
The individual steps ([`normalize`], [`expand`], [`frequency_table`],
[`themes::theme_responses`], [`filter::apply_filters`]) are also exposed.

See the [manual] for the input formats and the configuration of the command line tool.
*/

mod config;
pub mod builder;
pub mod catalog;
pub mod filter;
pub mod manual;
pub mod themes;

use log::{debug, info};

use std::collections::HashMap;

pub use crate::builder::{Builder, Responses};
pub use crate::catalog::AnswerCatalog;
pub use crate::config::*;
pub use crate::filter::FilterConstraints;
pub use crate::themes::{theme_responses, ThemeCatalog};

/// Buckets one raw value against the permitted answers of a question.
///
/// Missing and whitespace-only values are absent. Without permitted answers
/// (free text), the trimmed value is kept as is. Otherwise the trimmed value
/// must exactly match one of the permitted answers, or it is counted as other.
///
/// ```
/// use survey_tally::{normalize, NormalizedToken};
///
/// let permitted = vec!["Yes".to_string(), "No".to_string()];
/// assert_eq!(normalize(Some(" Yes "), Some(permitted.as_slice())), NormalizedToken::Answer("Yes".to_string()));
/// assert_eq!(normalize(Some("yes"), Some(permitted.as_slice())), NormalizedToken::Other);
/// assert_eq!(normalize(Some("  "), Some(permitted.as_slice())), NormalizedToken::Absent);
/// assert_eq!(normalize(Some(" why not "), None), NormalizedToken::Answer("why not".to_string()));
/// ```
pub fn normalize(value: Option<&str>, permitted: Option<&[String]>) -> NormalizedToken {
    let v = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return NormalizedToken::Absent,
    };
    match permitted {
        None => NormalizedToken::Answer(v.to_string()),
        Some(answers) if answers.iter().any(|a| a == v) => NormalizedToken::Answer(v.to_string()),
        Some(_) => NormalizedToken::Other,
    }
}

/// Splits a multi-answer cell on commas and buckets every fragment.
///
/// Empty fragments are dropped. A missing cell produces nothing.
pub fn expand(cell: Option<&str>, permitted: Option<&[String]>) -> Vec<NormalizedToken> {
    match cell {
        None => Vec::new(),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| normalize(Some(f), permitted))
            .collect(),
    }
}

/// A share of the total in percent, rounded to one decimal place.
///
/// Halves are rounded to the even digit: 1 out of 16 is 6.2.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        let pct = count as f64 / total as f64 * 100.0;
        (pct * 10.0).round_ties_even() / 10.0
    }
}

/// Counts the distinct tokens, ordered by decreasing count.
///
/// Ties keep the order in which the labels were first seen.
fn tally(tokens: &[NormalizedToken]) -> FrequencyTable {
    let mut counts: Vec<(&str, u64)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for label in tokens.iter().filter_map(|t| t.label()) {
        match positions.get(label) {
            Some(idx) => counts[*idx].1 += 1,
            None => {
                positions.insert(label, counts.len());
                counts.push((label, 1));
            }
        }
    }
    let total: u64 = counts.iter().map(|(_, c)| c).sum();
    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    FrequencyTable {
        rows: counts
            .into_iter()
            .map(|(answer, count)| FrequencyRow {
                answer: answer.to_string(),
                count,
                percentage: percentage(count, total),
            })
            .collect(),
        total,
    }
}

/// The distribution of the answers to one question.
///
/// Multi-select cells are expanded into one token per answer. Blank answers
/// are not counted. Returns nothing if the question is not in the responses.
pub fn frequency_table(
    catalog: &AnswerCatalog,
    question: &str,
    responses: &Responses,
) -> Option<FrequencyTable> {
    let cells = responses.column(question)?;
    let tokens: Vec<NormalizedToken> = match catalog.kind(question) {
        QuestionKind::MultiSelect(permitted) => cells
            .flat_map(|c| expand(c.as_str(), Some(permitted.as_slice())))
            .collect(),
        QuestionKind::SingleSelect(permitted) => cells
            .map(|c| normalize(c.as_str(), Some(permitted.as_slice())))
            .collect(),
        QuestionKind::FreeText | QuestionKind::ThemedFreeText => {
            cells.map(|c| normalize(c.as_str(), None)).collect()
        }
    };
    let table = tally(&tokens);
    debug!(
        "frequency_table: {:?}: {} answers, {} distinct",
        question,
        table.total,
        table.rows.len()
    );
    Some(table)
}

/// All the non-blank answers to a question, trimmed.
pub fn all_responses(responses: &Responses, question: &str) -> Option<Vec<String>> {
    let res: Vec<String> = responses
        .column(question)?
        .filter_map(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .collect();
    Some(res)
}

/// Analyzes one question according to its kind.
///
/// Returns nothing if the question is not in the responses.
pub fn analyze_question(
    catalog: &AnswerCatalog,
    themes: &ThemeCatalog,
    question: &str,
    responses: &Responses,
) -> Option<QuestionAnalysis> {
    let res = match catalog.kind(question) {
        QuestionKind::ThemedFreeText => {
            let all = all_responses(responses, question)?;
            if all.is_empty() {
                QuestionAnalysis::NoData
            } else {
                QuestionAnalysis::Themes(theme_responses(themes, &all))
            }
        }
        _ => {
            let table = frequency_table(catalog, question, responses)?;
            if table.is_empty() {
                QuestionAnalysis::NoData
            } else {
                QuestionAnalysis::Frequencies(table)
            }
        }
    };
    Some(res)
}

/// Runs a full pass over the survey.
///
/// Arguments:
/// * `catalog` the known questions and their permitted answers
/// * `themes` the themes for the free-text question
/// * `responses` all the responses of the survey. They are not modified.
/// * `constraints` the demographic filters selected by the user
pub fn run_survey_stats(
    catalog: &AnswerCatalog,
    themes: &ThemeCatalog,
    responses: &Responses,
    constraints: &FilterConstraints,
) -> SurveyStats {
    info!(
        "run_survey_stats: Processing {:?} responses, {:?} columns",
        responses.len(),
        responses.columns().len()
    );
    let (filters, filtered) = filter::demographic_filters(catalog, responses, constraints);
    info!(
        "run_survey_stats: {:?} responses left after filtering",
        filtered.len()
    );

    let mut questions: Vec<(String, QuestionAnalysis)> = Vec::new();
    for question in responses.columns() {
        if catalog.is_demographic(question) {
            continue;
        }
        if let Some(analysis) = analyze_question(catalog, themes, question, &filtered) {
            log_analysis(question, &analysis);
            questions.push((question.clone(), analysis));
        }
    }

    SurveyStats {
        total_records: responses.len() as u64,
        filtered_records: filtered.len() as u64,
        filters,
        questions,
    }
}

fn log_analysis(question: &str, analysis: &QuestionAnalysis) {
    info!("{}", question);
    match analysis {
        QuestionAnalysis::Frequencies(table) => {
            for row in table.rows.iter() {
                info!("{:>8} {:>5.1}% {}", row.count, row.percentage, row.answer);
            }
        }
        QuestionAnalysis::Themes(report) => {
            for (theme, pct) in report.percentages() {
                info!("{:>5.1}% {}", pct, theme);
            }
            info!("Total responses: {}", report.total());
        }
        QuestionAnalysis::NoData => {
            info!("No responses for this question in the filtered set.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Question;

    const ASSESSMENT: &str =
        "Have you ever used a leadership or personality assessment that was NOT required by an employer?";
    const SOURCES: &str = "Which sources do you take feedback on your capabilities from seriously?";

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn one_column(question: &str, values: &[&str]) -> Responses {
        let mut builder = Builder::new(&strings(&[question]), None).unwrap();
        for v in values {
            builder.add_row_simple(&strings(&[v])).unwrap();
        }
        builder.build()
    }

    fn rows(table: &FrequencyTable) -> Vec<(String, u64, f64)> {
        table
            .rows
            .iter()
            .map(|r| (r.answer.clone(), r.count, r.percentage))
            .collect()
    }

    #[test]
    fn normalize_buckets() {
        let permitted = strings(&["Yes", "No"]);
        let p = Some(permitted.as_slice());
        assert_eq!(normalize(None, p), NormalizedToken::Absent);
        assert_eq!(normalize(Some(""), p), NormalizedToken::Absent);
        assert_eq!(normalize(Some("\t "), None), NormalizedToken::Absent);
        assert_eq!(
            normalize(Some("No "), p),
            NormalizedToken::Answer("No".to_string())
        );
        assert_eq!(normalize(Some("NO"), p), NormalizedToken::Other);
        assert_eq!(normalize(Some("n/a"), p), NormalizedToken::Other);
        assert_eq!(normalize(Some("anything"), Some(&[][..])), NormalizedToken::Other);
    }

    #[test]
    fn expand_multi_select() {
        let permitted = strings(&[
            "Manager",
            "Peers",
            "Coach or Mentor",
            "Assessment tools",
            "Self-reflection only",
            "I generally distrust feedback",
        ]);
        let tokens = expand(Some("Manager, Peers, Bogus"), Some(permitted.as_slice()));
        assert_eq!(
            tokens,
            vec![
                NormalizedToken::Answer("Manager".to_string()),
                NormalizedToken::Answer("Peers".to_string()),
                NormalizedToken::Other,
            ]
        );
        assert!(expand(None, Some(permitted.as_slice())).is_empty());
        assert!(expand(Some(" , ,"), Some(permitted.as_slice())).is_empty());
    }

    #[test]
    fn single_select_scenario() {
        let _ = env_logger::builder().is_test(true).try_init();
        let responses = one_column(ASSESSMENT, &["Yes", "Yes", "No", "", "Maybe"]);
        let table = frequency_table(&AnswerCatalog::core15(), ASSESSMENT, &responses).unwrap();
        assert_eq!(table.total, 4);
        assert_eq!(
            rows(&table),
            vec![
                ("Yes".to_string(), 2, 50.0),
                ("No".to_string(), 1, 25.0),
                ("other".to_string(), 1, 25.0),
            ]
        );
    }

    #[test]
    fn multi_select_counts_every_answer() {
        let responses = one_column(
            SOURCES,
            &["Manager, Peers", "Manager, Bogus", "", "Peers", "Coach or Mentor"],
        );
        let table = frequency_table(&AnswerCatalog::core15(), SOURCES, &responses).unwrap();
        assert_eq!(table.total, 6);
        assert_eq!(
            rows(&table),
            vec![
                ("Manager".to_string(), 2, 33.3),
                ("Peers".to_string(), 2, 33.3),
                ("other".to_string(), 1, 16.7),
                ("Coach or Mentor".to_string(), 1, 16.7),
            ]
        );
    }

    #[test]
    fn free_text_is_counted_verbatim() {
        let responses = one_column("Comments?", &[" great ", "great", "meh", ""]);
        let table = frequency_table(&AnswerCatalog::core15(), "Comments?", &responses).unwrap();
        assert_eq!(
            rows(&table),
            vec![("great".to_string(), 2, 66.7), ("meh".to_string(), 1, 33.3)]
        );
    }

    #[test]
    fn catalogued_tokens_never_leak() {
        let responses = one_column(
            SOURCES,
            &["Manager,peers", "??", "Self-reflection only, Assessment tools,", "x,y,z"],
        );
        let catalog = AnswerCatalog::core15();
        let permitted = catalog.permitted(SOURCES).unwrap();
        let table = frequency_table(&catalog, SOURCES, &responses).unwrap();
        for row in table.rows.iter() {
            assert!(row.answer == OTHER_LABEL || permitted.contains(&row.answer));
        }
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let responses = one_column("Q", &["a", "b", "c", "c", "d", "e", "f"]);
        let table = frequency_table(&AnswerCatalog::core15(), "Q", &responses).unwrap();
        let sum: f64 = table.rows.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "sum: {}", sum);
    }

    #[test]
    fn percentages_round_halves_to_even() {
        assert_eq!(percentage(1, 16), 6.2);
        assert_eq!(percentage(1, 80), 1.2);
        assert_eq!(percentage(3, 16), 18.8);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn multi_select_percentages_sum_to_one_hundred() {
        let mut values = vec!["Manager, Peers, Coach or Mentor"; 5];
        values.push("Bogus");
        let responses = one_column(SOURCES, &values);
        let table = frequency_table(&AnswerCatalog::core15(), SOURCES, &responses).unwrap();
        assert_eq!(table.total, 16);
        assert_eq!(
            rows(&table),
            vec![
                ("Manager".to_string(), 5, 31.2),
                ("Peers".to_string(), 5, 31.2),
                ("Coach or Mentor".to_string(), 5, 31.2),
                ("other".to_string(), 1, 6.2),
            ]
        );
        // Each row is off by at most half a tenth.
        let sum: f64 = table.rows.iter().map(|r| r.percentage).sum();
        let bound = 0.05 * table.rows.len() as f64;
        assert!((sum - 100.0).abs() <= bound + 1e-9, "sum: {}", sum);
    }

    #[test]
    fn empty_and_missing() {
        let responses = one_column(ASSESSMENT, &["", "  "]);
        let catalog = AnswerCatalog::core15();
        let table = frequency_table(&catalog, ASSESSMENT, &responses).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.total, 0);
        assert!(frequency_table(&catalog, SOURCES, &responses).is_none());
        let themes = ThemeCatalog::frustrations();
        assert_eq!(
            analyze_question(&catalog, &themes, ASSESSMENT, &responses),
            Some(QuestionAnalysis::NoData)
        );
        assert_eq!(analyze_question(&catalog, &themes, SOURCES, &responses), None);
    }

    #[test]
    fn ties_are_stable() {
        let responses = one_column("Q", &["b", "a", "c", "a", "b"]);
        let catalog = AnswerCatalog::core15();
        let first = frequency_table(&catalog, "Q", &responses).unwrap();
        let second = frequency_table(&catalog, "Q", &responses).unwrap();
        assert_eq!(first, second);
        let answers: Vec<&str> = first.rows.iter().map(|r| r.answer.as_str()).collect();
        assert_eq!(answers, vec!["b", "a", "c"]);
    }

    #[test]
    fn full_pass() {
        let catalog = AnswerCatalog::new(
            vec![
                Question::single("Gender", &["Male", "Female"]),
                Question::single("Like?", &["Yes", "No"]),
                Question::themed("Why not?"),
            ],
            strings(&["Gender"]),
            Some("ID".to_string()),
        )
        .unwrap();
        let mut builder = Builder::new(&strings(&["ID", "Gender", "Like?", "Why not?"]), Some("ID")).unwrap();
        for row in [
            ["1", "Male", "Yes", ""],
            ["2", "Female", "No", "too expensive"],
            ["3", "Female", "", ""],
        ] {
            builder.add_row_simple(&strings(&row)).unwrap();
        }
        let responses = builder.build();
        let themes = ThemeCatalog::frustrations();

        let constraints = FilterConstraints::new().accept("Gender", &strings(&["Female"]));
        let stats = run_survey_stats(&catalog, &themes, &responses, &constraints);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.filtered_records, 2);
        assert_eq!(stats.filters.len(), 1);
        assert_eq!(stats.filters[0].options, strings(&["Male", "Female"]));
        let questions: Vec<&str> = stats.questions.iter().map(|(q, _)| q.as_str()).collect();
        assert_eq!(questions, vec!["Like?", "Why not?"]);
        match &stats.questions[1].1 {
            QuestionAnalysis::Themes(report) => {
                assert_eq!(report.groups[0].theme, "Cost/money");
                assert_eq!(report.total(), 1);
            }
            other => panic!("unexpected analysis: {:?}", other),
        }

        let constraints = FilterConstraints::new().accept("Gender", &strings(&["Male"]));
        let stats = run_survey_stats(&catalog, &themes, &responses, &constraints);
        assert_eq!(stats.questions[1].1, QuestionAnalysis::NoData);
        // The source responses are shared between passes and never modified.
        assert_eq!(responses.len(), 3);
    }
}
