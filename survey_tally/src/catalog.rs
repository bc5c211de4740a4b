use std::collections::{HashMap, HashSet};

pub use crate::config::*;

static UNKNOWN_QUESTION: QuestionKind = QuestionKind::FreeText;

/// The registry of all the known questions.
///
/// The catalog is built once and then only read. Questions that are not
/// registered are treated as free text.
///
/// ```
/// use survey_tally::catalog::*;
///
/// let catalog = AnswerCatalog::new(
///     vec![Question::single("Do you like tea?", &["Yes", "No"])],
///     vec![],
///     None,
/// )?;
/// assert_eq!(catalog.permitted("Do you like tea?").map(|p| p.len()), Some(2));
/// assert_eq!(catalog.kind("Why?"), &QuestionKind::FreeText);
/// # Ok::<(), SurveyErrors>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnswerCatalog {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
    demographics: Vec<String>,
    id_column: Option<String>,
}

impl AnswerCatalog {
    /// Checks that no question is declared twice.
    pub fn new(
        questions: Vec<Question>,
        demographics: Vec<String>,
        id_column: Option<String>,
    ) -> Result<AnswerCatalog, SurveyErrors> {
        let mut seen: HashSet<&str> = HashSet::new();
        for q in questions.iter() {
            if !seen.insert(q.text.as_str()) {
                return Err(SurveyErrors::DuplicateQuestion(q.text.clone()));
            }
        }
        Ok(AnswerCatalog::assemble(questions, demographics, id_column))
    }

    fn assemble(
        questions: Vec<Question>,
        demographics: Vec<String>,
        id_column: Option<String>,
    ) -> AnswerCatalog {
        let index = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| (q.text.clone(), idx))
            .collect();
        AnswerCatalog {
            questions,
            index,
            demographics,
            id_column,
        }
    }

    pub fn with_id_column(self, id_column: Option<String>) -> AnswerCatalog {
        AnswerCatalog { id_column, ..self }
    }

    pub fn kind(&self, question: &str) -> &QuestionKind {
        match self.index.get(question) {
            Some(idx) => &self.questions[*idx].kind,
            None => &UNKNOWN_QUESTION,
        }
    }

    pub fn permitted(&self, question: &str) -> Option<&[String]> {
        self.kind(question).permitted()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The questions used as filters, in the order they are offered.
    pub fn demographics(&self) -> &[String] {
        &self.demographics
    }

    pub fn is_demographic(&self, question: &str) -> bool {
        self.demographics.iter().any(|d| d == question)
    }

    /// The column holding the respondent identifier, if any.
    pub fn id_column(&self) -> Option<&str> {
        self.id_column.as_deref()
    }

    /// The catalog of the Core15 D2C survey.
    pub fn core15() -> AnswerCatalog {
        let questions = CORE15_ANSWERS
            .iter()
            .map(|(text, answers)| {
                if CORE15_MULTI_SELECT.contains(text) {
                    Question::multi(text, answers)
                } else {
                    Question::single(text, answers)
                }
            })
            .chain(std::iter::once(Question::themed(CORE15_FRUSTRATION)))
            .collect();
        AnswerCatalog::assemble(
            questions,
            CORE15_DEMOGRAPHICS.iter().map(|s| s.to_string()).collect(),
            Some(CORE15_ID_COLUMN.to_string()),
        )
    }
}

pub const CORE15_ID_COLUMN: &str = "What is your Prolific ID?";

pub const CORE15_FRUSTRATION: &str = "What frustrates you most about trying to improve as a leader?";

pub const CORE15_DEMOGRAPHICS: &[&str] = &[
    "How many years of professional experience do you have?",
    "Which best describes your current role?",
    "What is your gender?",
];

const CORE15_MULTI_SELECT: &[&str] = &[
    "In the last 6 months, have you experienced any of the following?",
    "What have you personally paid for?",
    "Which sources do you take feedback on your capabilities from seriously?",
    "What most often causes you to stop engaging with self-development tools?",
];

const CORE15_ANSWERS: &[(&str, &[&str])] = &[
    // Section 1: triggers
    (
        "In the last 6 months, have you experienced any of the following?",
        &[
            "Missed a promotion or opportunity",
            "Received critical feedback about leadership or influence",
            "Felt ineffective managing others",
            "Struggled with conflict or alignment",
            "Felt stuck despite strong technical skills",
            "None of the above",
        ],
    ),
    (
        "Which of the following do you believe most contributed to these outcomes?",
        &[
            "Gaps in my leadership or interpersonal skills",
            "Lack of clear feedback or expectations",
            "Organizational politics or bias",
            "Limited opportunity or timing",
            "I'm not sure what the real cause is",
            "Other (open text)",
        ],
    ),
    (
        "Which of these best describes your current motivation to improve leadership skills?",
        &[
            "I am actively trying to improve right now",
            "I know I should improve, but haven't taken action",
            "It matters, but not urgent",
            "Not a priority for me",
        ],
    ),
    // Section 2: spending
    (
        "In the last 12 months, how much have you personally spent on professional or leadership development?",
        &["0", "<$100", "$100-$500", "$500-$1,500", "$1,500+"],
    ),
    (
        "What best explains the reason for your spending on leadership development over the past 12 months?",
        &[
            "My employer typically pays for this",
            "I didn't actively look for solutions",
            "I looked, but didn't find anything credible",
            "I found options, but they felt too expensive",
            "I don't usually pay for self-development",
            "Other (open text)",
        ],
    ),
    (
        "What have you personally paid for?",
        &[
            "Online course",
            "Assessment or personality test",
            "Coaching (group or 1:1)",
            "Books or learning subscriptions",
            "Nothing paid personally",
        ],
    ),
    (
        "If a leadership assessment + personalized training system clearly improved your effectiveness as a leader, what would feel like a reasonable monthly price?",
        &["0", "$10-$25", "$25-$50", "$50-$100", "$100+"],
    ),
    (
        "When it comes to leadership or professional development, I generally expect:",
        &[
            "My Employer to pay",
            "A mix of employer and personal spending",
            "To pay myself",
        ],
    ),
    // Section 3: feedback
    (
        "Have you ever used a leadership or personality assessment that was NOT required by an employer?",
        &["Yes", "No"],
    ),
    (
        "Which sources do you take feedback on your capabilities from seriously?",
        &[
            "Manager",
            "Peers",
            "Coach or Mentor",
            "Assessment tools",
            "Self-reflection only",
            "I generally distrust feedback",
        ],
    ),
    (
        "Seeing my leadership skills benchmarked against others would feel:",
        &[
            "Motivating",
            "Interesting but neutral",
            "Anxiety-inducing",
            "Not useful",
            "Actively discouraging",
        ],
    ),
    // Section 4: engagement
    (
        "Think about the last self-improvement effort you started on your own. What happened?",
        &[
            "I stuck with it consistently",
            "I stayed engaged for a while, then dropped off",
            "I barely got started",
            "I avoid self-directed programs",
        ],
    ),
    (
        "What most often causes you to stop engaging with self-development tools?",
        &[
            "Time constraints",
            "Lack of accountability",
            "Content wasn't relevant",
            "Hard to see progress",
            "Lost motivation",
            "Cost",
            "Other",
        ],
    ),
    (
        "What would most increase your likelihood of sticking with a leadership development system?",
        &[
            "Clear progress tracking",
            "Personalized recommendations",
            "Social comparison or benchmarks",
            "External accountability (coach, group)",
            "Short, lightweight activities",
        ],
    ),
    // Section 6: demographics
    (
        "How many years of professional experience do you have?",
        &["0-3", "4-7", "8-15", "16+"],
    ),
    (
        "Which best describes your current role?",
        &[
            "Individual Contributor",
            "People Manager",
            "Senior Leader",
            "Founder/Executive",
        ],
    ),
    (
        "What is your gender?",
        &["Male", "Female", "Prefer not to say"],
    ),
];
