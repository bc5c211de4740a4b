use log::debug;
use std::collections::HashSet;

pub use crate::config::*;

/// The themes used to group free-text responses, in priority order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl ThemeCatalog {
    pub fn new(themes: Vec<Theme>) -> Result<ThemeCatalog, SurveyErrors> {
        let mut seen: HashSet<&str> = HashSet::new();
        for t in themes.iter() {
            if !seen.insert(t.name.as_str()) || t.name == OVERFLOW_THEME {
                return Err(SurveyErrors::DuplicateTheme(t.name.clone()));
            }
        }
        let themes = themes
            .into_iter()
            .map(|t| Theme {
                keywords: t.keywords.iter().map(|k| k.to_lowercase()).collect(),
                ..t
            })
            .collect();
        Ok(ThemeCatalog { themes })
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// The position of the first theme with a keyword contained in the response.
    fn find_theme(&self, response: &str) -> Option<usize> {
        let lowered = response.to_lowercase();
        self.themes
            .iter()
            .position(|t| t.keywords.iter().any(|k| lowered.contains(k.as_str())))
    }

    /// The frustrations commonly reported about leadership development.
    pub fn frustrations() -> ThemeCatalog {
        ThemeCatalog {
            themes: vec![
                Theme::new(
                    "Time constraints",
                    &[
                        "time",
                        "busy",
                        "schedule",
                        "hours",
                        "workload",
                        "overwhelmed",
                        "no time",
                        "don't have time",
                        "lack of time",
                    ],
                ),
                Theme::new(
                    "Lack of feedback/guidance",
                    &[
                        "feedback",
                        "guidance",
                        "mentor",
                        "coach",
                        "direction",
                        "advice",
                        "support",
                        "help",
                        "don't know how",
                        "unsure how",
                    ],
                ),
                Theme::new(
                    "Cost/money",
                    &[
                        "cost",
                        "expensive",
                        "money",
                        "price",
                        "afford",
                        "budget",
                        "financial",
                        "pay",
                        "paid",
                    ],
                ),
                Theme::new(
                    "Not seeing progress/results",
                    &[
                        "progress",
                        "results",
                        "improvement",
                        "change",
                        "see results",
                        "measurable",
                        "outcomes",
                        "impact",
                    ],
                ),
                Theme::new(
                    "Lack of accountability/motivation",
                    &[
                        "accountability",
                        "motivation",
                        "discipline",
                        "consistency",
                        "stick with",
                        "follow through",
                        "commitment",
                    ],
                ),
                Theme::new(
                    "Content not relevant/applicable",
                    &[
                        "relevant",
                        "applicable",
                        "practical",
                        "real-world",
                        "useful",
                        "actionable",
                        "relatable",
                    ],
                ),
                Theme::new(
                    "Information overload/too much",
                    &[
                        "overwhelming",
                        "too much",
                        "information overload",
                        "complex",
                        "complicated",
                        "confusing",
                    ],
                ),
                Theme::new(
                    "Lack of resources/tools",
                    &[
                        "resources",
                        "tools",
                        "access",
                        "available",
                        "options",
                        "programs",
                        "platforms",
                    ],
                ),
                Theme::new(
                    "Organizational/systemic barriers",
                    &[
                        "company",
                        "organization",
                        "employer",
                        "system",
                        "culture",
                        "politics",
                        "structure",
                        "management",
                    ],
                ),
                Theme::new(
                    "Self-doubt/confidence",
                    &[
                        "confidence",
                        "self-doubt",
                        "imposter",
                        "worthy",
                        "capable",
                        "qualified",
                        "deserve",
                    ],
                ),
            ],
        }
    }
}

/// Groups free-text responses by theme.
///
/// Each response goes to the first theme (in catalog order) that has one of its
/// keywords in the lowercased response, and to this theme only. Responses
/// matching no theme are collected under [`OVERFLOW_THEME`]. Empty groups are not
/// reported.
pub fn theme_responses(catalog: &ThemeCatalog, responses: &[String]) -> ThemeReport {
    let mut assigned: Vec<Vec<String>> = vec![Vec::new(); catalog.themes.len()];
    let mut uncategorized: Vec<String> = Vec::new();

    for response in responses.iter() {
        match catalog.find_theme(response) {
            Some(idx) => {
                debug!(
                    "theme_responses: {:?} -> {}",
                    response, catalog.themes[idx].name
                );
                assigned[idx].push(response.clone());
            }
            None => {
                debug!("theme_responses: {:?} -> {}", response, OVERFLOW_THEME);
                uncategorized.push(response.clone());
            }
        }
    }

    let mut groups: Vec<ThemeGroup> = catalog
        .themes
        .iter()
        .zip(assigned)
        .filter(|(_, rs)| !rs.is_empty())
        .map(|(t, rs)| ThemeGroup {
            theme: t.name.clone(),
            responses: rs,
        })
        .collect();
    if !uncategorized.is_empty() {
        groups.push(ThemeGroup {
            theme: OVERFLOW_THEME.to_string(),
            responses: uncategorized,
        });
    }

    ThemeReport {
        groups,
        responses: responses.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn frustration_scenario() {
        let _ = env_logger::builder().is_test(true).try_init();
        let responses = strings(&[
            "no time to do anything",
            "too expensive for me",
            "great program",
        ]);
        let report = theme_responses(&ThemeCatalog::frustrations(), &responses);
        let names: Vec<&str> = report.groups.iter().map(|g| g.theme.as_str()).collect();
        assert_eq!(
            names,
            vec!["Time constraints", "Cost/money", "Other/Uncategorized"]
        );
        assert_eq!(report.groups[0].responses, strings(&["no time to do anything"]));
        assert_eq!(report.groups[1].responses, strings(&["too expensive for me"]));
        assert_eq!(report.groups[2].responses, strings(&["great program"]));
        assert_eq!(report.total(), 3);
        let pcts: Vec<f64> = report.percentages().iter().map(|p| p.1).collect();
        assert_eq!(pcts, vec![33.3, 33.3, 33.3]);
    }

    #[test]
    fn first_match_wins() {
        // Matches both "Time constraints" and "Cost/money".
        let responses = strings(&["No TIME and no money"]);
        let report = theme_responses(&ThemeCatalog::frustrations(), &responses);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].theme, "Time constraints");
    }

    #[test]
    fn empty_input() {
        let report = theme_responses(&ThemeCatalog::frustrations(), &[]);
        assert!(report.groups.is_empty());
        assert_eq!(report.total(), 0);
        assert!(report.percentages().is_empty());
    }

    #[test]
    fn theming_is_total_and_idempotent() {
        let responses = strings(&[
            "my company culture",
            "I lack confidence",
            "nothing really",
            "too much content, too complicated",
            "hard to stick with it",
            "no feedback",
            "another thing",
        ]);
        let catalog = ThemeCatalog::frustrations();
        let first = theme_responses(&catalog, &responses);
        let second = theme_responses(&catalog, &responses);
        assert_eq!(first, second);
        let mut seen: Vec<String> = first
            .groups
            .iter()
            .flat_map(|g| g.responses.iter().cloned())
            .collect();
        seen.sort();
        let mut expected = responses.clone();
        expected.sort();
        assert_eq!(seen, expected);
        let last = first.groups.last().map(|g| g.theme.as_str());
        assert_eq!(last, Some(OVERFLOW_THEME));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let catalog = ThemeCatalog::new(vec![Theme::new("Tea", &["Earl Grey"])]).unwrap();
        let report = theme_responses(&catalog, &strings(&["EARL GREY please"]));
        assert_eq!(report.groups[0].theme, "Tea");
    }

    #[test]
    fn duplicate_theme_is_rejected() {
        let res = ThemeCatalog::new(vec![Theme::new("A", &["a"]), Theme::new("A", &["b"])]);
        assert_eq!(res, Err(SurveyErrors::DuplicateTheme("A".to_string())));
        let res = ThemeCatalog::new(vec![Theme::new(OVERFLOW_THEME, &["a"])]);
        assert!(res.is_err());
    }
}
