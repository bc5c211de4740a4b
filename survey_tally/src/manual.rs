/*!

This is the long-form manual for `survey_tally` and `surveydash`.

## Input formats

The following formats are supported:
* `xlsx` Excel workbook
* `csv` Comma Separated Values

In both cases, the first row is the header. Each column is one question and is
identified by the exact text in the header. Each following row is one respondent.

When no input type is given, files ending in `.csv` are read as `csv` and all
the other files as `xlsx`.

### `xlsx`

The first worksheet is used, unless a worksheet name is given with
`--excel-worksheet-name` (or `excelWorksheetName` in the configuration).

Cells are read as follows:
* text is kept as it is, including values such as `n/a`
* empty cells are blank
* whole numbers are written without decimals (`0`, not `0.0`)
* booleans become `True` or `False`
* dates are written as `YYYY-MM-DD HH:MM:SS`
* error cells stop the program

### `csv`

Rows shorter than the header are completed with blank cells. Rows longer than
the header stop the program. Cells containing commas (for example multi-select
answers) must be quoted.

## How answers are counted

Each known question has a list of permitted answers:

* *single-select* questions: the trimmed answer is compared with the permitted
  answers (case-sensitive). Anything else is counted as `other`.
* *multi-select* questions: the answer is split on commas, and every part is
  treated as a single-select answer.
* *free-text* questions (not in the catalog): the trimmed answers are counted as
  they are.
* the *themed* question: the answers are grouped by theme, using keywords. An
  answer goes to the first theme with a matching keyword, or to
  `Other/Uncategorized`.

Blank answers are never counted. Percentages are computed on the counted answers
and rounded to one decimal place. When no answer is left, the question is
reported with `"noData": true`.

## Filters

The demographic questions are not analyzed; they are used as filters. A row is
kept when, for every filtered question, its value is one of the selected values.
Filters are given in the configuration or with `--filter`:

```bash
surveydash -i survey.xlsx --filter "What is your gender?=Female" \
  --filter "Which best describes your current role?=People Manager"
```

Repeating `--filter` for the same question selects several values.

## Configuration

All the settings can be provided in a JSON file with `--config`:

```json
{
  "outputSettings": { "surveyName": "Core15 Survey Results" },
  "fileSource": {
    "provider": "csv",
    "filePath": "responses.csv",
    "idColumn": "What is your Prolific ID?"
  },
  "filters": { "What is your gender?": ["Female"] }
}
```

File paths are relative to the directory of the configuration file. The
command line options take precedence over the configuration.

Without `questions`, the built-in catalog of the Core15 survey is used. A custom
catalog looks like:

```json
{
  "questions": [
    { "question": "Do you like tea?", "answers": ["Yes", "No"] },
    { "question": "Which teas?", "answers": ["Green", "Black"], "multiSelect": true },
    { "question": "What would you change?", "themed": true }
  ],
  "demographics": ["What is your age?"],
  "themes": [ { "name": "Price", "keywords": ["cost", "price"] } ]
}
```

## Output

The report is written in JSON to the file given with `--out` (or `outputPath`),
or to the standard output:

```json
{
  "config": { "survey": "Core15 Survey Results", "input": "responses.csv", "filters": {} },
  "records": { "total": 5, "filtered": 5 },
  "filters": [ { "question": "What is your gender?", "options": ["Male", "Female"] } ],
  "results": [
    { "question": "Do you like tea?",
      "answers": [ { "answer": "Yes", "count": 2, "percentage": 66.7 } ] }
  ]
}
```

With `--reference`, the report is compared with a previous report and the
program fails if they differ.
*/
