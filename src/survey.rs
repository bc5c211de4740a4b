use log::{debug, info, warn};

use survey_tally::*;

use snafu::{prelude::*, ErrorCompat, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::io_common::{make_default_id, simplify_file_name, ParsedTable};

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("No worksheet or no header found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Line {lineno}: cell {content} cannot be read"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a line of the CSV file"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("No header found in {path}"))]
    EmptyCsv { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the report to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid survey data"))]
    Tally { source: SurveyErrors },
    #[snafu(display("Filters must be written QUESTION=VALUE, got {filter:?}"))]
    InvalidFilter { filter: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

fn read_response_data(path: &str, cfs: &FileSource) -> DashResult<ParsedTable> {
    let provider = cfs.provider();
    info!("Attempting to read {} file {:?}", provider, path);
    match provider.as_str() {
        "xlsx" | "excel" => io_excel::read_excel_file(path, cfs.excel_worksheet_name.as_deref()),
        "csv" => io_csv::read_csv_file(path),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Turns the raw table into responses. Respondents without an identifier column
/// are named after the file and the line.
fn validate_rows(
    path: &str,
    table: &ParsedTable,
    catalog: &AnswerCatalog,
) -> DashResult<Responses> {
    let default_id = make_default_id(path);
    let mut builder = Builder::new(&table.header, catalog.id_column()).context(TallySnafu {})?;
    if !builder.has_id_column() {
        debug!(
            "validate_rows: no identifier column {:?}, using line numbers",
            catalog.id_column()
        );
    }
    for row in table.rows.iter() {
        let added = if builder.has_id_column() {
            builder.add_row_simple(&row.cells)
        } else {
            let cells: Vec<Cell> = row.cells.iter().map(|c| Cell::from_raw(c)).collect();
            builder.add_row(Some(default_id(row.lineno)), cells)
        };
        added.context(TallySnafu {})?;
    }
    Ok(builder.build())
}

fn frequencies_to_json(table: &FrequencyTable) -> Vec<JSValue> {
    table
        .rows
        .iter()
        .map(|r| json!({"answer": r.answer, "count": r.count, "percentage": r.percentage}))
        .collect()
}

fn themes_to_json(report: &ThemeReport) -> Vec<JSValue> {
    report
        .groups
        .iter()
        .zip(report.percentages())
        .map(|(g, (_, pct))| {
            json!({"theme": g.theme, "count": g.responses.len(), "percentage": pct})
        })
        .collect()
}

fn build_summary_js(
    config: &SurveyConfig,
    input_path: &str,
    constraints: &FilterConstraints,
    stats: &SurveyStats,
) -> JSValue {
    let mut filters_js: JSMap<String, JSValue> = JSMap::new();
    for (question, values) in constraints.active() {
        filters_js.insert(question.clone(), json!(values));
    }
    let dimensions: Vec<JSValue> = stats
        .filters
        .iter()
        .map(|d| json!({"question": d.question, "options": d.options}))
        .collect();
    let results: Vec<JSValue> = stats
        .questions
        .iter()
        .map(|(question, analysis)| match analysis {
            QuestionAnalysis::Frequencies(table) => {
                json!({"question": question, "answers": frequencies_to_json(table)})
            }
            QuestionAnalysis::Themes(report) => json!({
                "question": question,
                "themes": themes_to_json(report),
                "responses": report.responses,
                "totalResponses": report.total()
            }),
            QuestionAnalysis::NoData => json!({"question": question, "noData": true}),
        })
        .collect();
    json!({
        "config": {
            "survey": config.output_settings.survey_name,
            "input": simplify_file_name(input_path),
            "filters": filters_js
        },
        "records": {"total": stats.total_records, "filtered": stats.filtered_records},
        "filters": dimensions,
        "results": results
    })
}

fn join_root(root: &Option<PathBuf>, path: &str) -> String {
    match root {
        Some(r) => r.join(path).display().to_string(),
        None => path.to_string(),
    }
}

/// Runs a full pass and returns the report, along with the place it should be written to.
pub fn build_report(args: &Args) -> DashResult<(JSValue, Option<String>)> {
    let (config, root): (SurveyConfig, Option<PathBuf>) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?;
            (config, Some(root_p.to_path_buf()))
        }
        None => (SurveyConfig::core15(), None),
    };
    info!("config: {:?}", config);

    // The command line takes precedence over the configuration.
    let mut cfs = config.file_source.clone();
    let input_path = match &args.input {
        Some(input) => {
            cfs.file_path = input.clone();
            cfs.provider = args.input_type.clone();
            input.clone()
        }
        None => {
            if args.input_type.is_some() {
                cfs.provider = args.input_type.clone();
            }
            join_root(&root, &cfs.file_path)
        }
    };
    if args.excel_worksheet_name.is_some() {
        cfs.excel_worksheet_name = args.excel_worksheet_name.clone();
    }
    let out_path: Option<String> = match (&args.out, &config.output_settings.output_path) {
        (Some(out), _) => Some(out.clone()),
        (None, Some(out)) => Some(join_root(&root, out)),
        (None, None) => None,
    };

    let catalog = build_catalog(&config)?;
    let themes = build_themes(&config)?;
    let mut constraints = build_constraints(&config);
    if let Some(filters) = &args.filter {
        merge_cli_filters(&mut constraints, filters)?;
    }
    debug!("constraints: {:?}", constraints);

    let table = read_response_data(&input_path, &cfs)?;
    let responses = validate_rows(&input_path, &table, &catalog)?;

    let stats = run_survey_stats(&catalog, &themes, &responses, &constraints);

    let result_js = build_summary_js(&config, &input_path, &constraints, &stats);
    Ok((result_js, out_path))
}

pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let (result_js, out_path) = build_report(args)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out_path.as_deref() {
        None | Some("stdout") | Some("") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            info!("Writing report to {:?}", path);
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated report and reference report")
        }
        info!("The report matches the reference {:?}", summary_p);
    }

    Ok(())
}

pub fn print_error(e: &DashError) {
    eprintln!("An error occured {}", e);
    if let Some(source) = std::error::Error::source(e) {
        eprintln!("caused by: {}", source);
    }
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}

#[cfg(test)]
fn run_survey_test(test_name: &str, config_lpath: &str, summary_lpath: &str, filters: &[&str]) {
    let _ = env_logger::builder().is_test(true).try_init();
    let test_dir =
        option_env!("SURVEY_TEST_DIR").unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests"));
    info!("Running test {}", test_name);
    let args = Args {
        config: Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        reference: Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        out: Some("stdout".to_string()),
        filter: if filters.is_empty() {
            None
        } else {
            Some(filters.iter().map(|s| s.to_string()).collect())
        },
        ..Args::default()
    };
    let res = run_dashboard(&args);
    if let Err(e) = &res {
        warn!("Error occured {:?}", e);
        print_error(e);
    }
    assert!(res.is_ok(), "test {} failed", test_name);
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    run_survey_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
        &[],
    )
}

#[cfg(test)]
mod tests {

    use super::*;

    fn fixture(lpath: &str) -> String {
        format!("{}/tests/{}", env!("CARGO_MANIFEST_DIR"), lpath)
    }

    #[test]
    fn core15_small() {
        test_wrapper("core15_small");
    }

    #[test]
    fn core15_female() {
        test_wrapper("core15_female");
    }

    #[test]
    fn core15_cli_filter_overrides_config() {
        run_survey_test(
            "core15_female",
            "core15_female_config.json",
            "core15_nonbinary_expected_summary.json",
            &["What is your gender?=Nonbinary"],
        );
    }

    #[test]
    fn input_without_config() {
        let args = Args {
            input: Some(fixture("core15_small/core15_small.csv")),
            filter: Some(vec!["What is your gender?=Male".to_string()]),
            ..Args::default()
        };
        let (js, out) = build_report(&args).unwrap();
        assert_eq!(out, None);
        assert_eq!(js["config"]["survey"], json!("Core15 Survey Results"));
        assert_eq!(js["config"]["input"], json!("core15_small.csv"));
        assert_eq!(js["records"], json!({"total": 5, "filtered": 2}));
        let frustration = &js["results"][2];
        assert_eq!(
            frustration["themes"],
            json!([{"theme": "Cost/money", "count": 1, "percentage": 100.0}])
        );
    }

    #[test]
    fn reference_mismatch_fails() {
        let args = Args {
            config: Some(fixture("core15_small/core15_small_config.json")),
            reference: Some(fixture("core15_female/core15_female_expected_summary.json")),
            out: Some("stdout".to_string()),
            ..Args::default()
        };
        assert!(run_dashboard(&args).is_err());
    }

    #[test]
    fn missing_input_file() {
        let args = Args {
            input: Some(fixture("core15_small/does_not_exist.csv")),
            ..Args::default()
        };
        assert!(matches!(
            build_report(&args),
            Err(DashError::CsvOpen { .. })
        ));
    }

    #[test]
    fn rows_without_identifier() {
        let table = ParsedTable {
            header: vec!["Q".to_string()],
            rows: vec![io_common::ParsedRow {
                lineno: 2,
                cells: vec!["a".to_string()],
            }],
        };
        let responses = validate_rows("in.csv", &table, &AnswerCatalog::core15()).unwrap();
        assert_eq!(
            responses.rows()[0].id,
            Some("in.csv-00000002".to_string())
        );
    }

    #[test]
    fn rows_too_wide() {
        let table = ParsedTable {
            header: vec!["Q".to_string()],
            rows: vec![io_common::ParsedRow {
                lineno: 2,
                cells: vec!["a".to_string(), "b".to_string()],
            }],
        };
        assert!(matches!(
            validate_rows("in.csv", &table, &AnswerCatalog::core15()),
            Err(DashError::Tally { .. })
        ));
    }
}
