use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

use crate::builder::Responses;
use crate::catalog::AnswerCatalog;
pub use crate::config::*;

/// The accepted values for each filtered question.
///
/// A question without constraint, or with an empty set of accepted values,
/// lets every row through.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FilterConstraints {
    accepted: BTreeMap<String, BTreeSet<String>>,
}

impl FilterConstraints {
    pub fn new() -> FilterConstraints {
        FilterConstraints::default()
    }

    /// Adds accepted values for a question, on top of the ones already accepted.
    pub fn accept(mut self, question: &str, values: &[String]) -> FilterConstraints {
        self.insert(question, values);
        self
    }

    pub fn insert(&mut self, question: &str, values: &[String]) {
        self.accepted
            .entry(question.to_string())
            .or_default()
            .extend(values.iter().cloned());
    }

    /// Replaces the accepted values of a question.
    pub fn replace(&mut self, question: &str, values: &[String]) {
        self.accepted
            .insert(question.to_string(), values.iter().cloned().collect());
    }

    pub fn accepted(&self, question: &str) -> Option<&BTreeSet<String>> {
        self.accepted.get(question).filter(|s| !s.is_empty())
    }

    /// The questions that actually restrict the rows, with their accepted values.
    pub fn active(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.accepted.iter().filter(|(_, s)| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    fn only(&self, question: &str) -> FilterConstraints {
        let mut res = FilterConstraints::new();
        if let Some(values) = self.accepted.get(question) {
            res.accepted.insert(question.to_string(), values.clone());
        }
        res
    }

    fn without(&self, questions: &[String]) -> FilterConstraints {
        FilterConstraints {
            accepted: self
                .accepted
                .iter()
                .filter(|(q, _)| !questions.contains(*q))
                .map(|(q, s)| (q.clone(), s.clone()))
                .collect(),
        }
    }
}

/// Keeps the rows whose raw value is accepted for every constrained question.
///
/// Constraints on questions that are not in the collection are ignored.
pub fn apply_filters(responses: &Responses, constraints: &FilterConstraints) -> Responses {
    let active: Vec<(&String, &BTreeSet<String>)> = constraints
        .active()
        .filter(|(q, _)| {
            let present = responses.has_column(q);
            if !present {
                warn!("apply_filters: no column for filter {:?}, skipping", q);
            }
            present
        })
        .collect();
    let res = responses.select(|row| {
        active
            .iter()
            .all(|(q, accepted)| accepted.contains(responses.cell(row, q).coerced()))
    });
    debug!(
        "apply_filters: {} constraints, {} -> {} rows",
        active.len(),
        responses.len(),
        res.len()
    );
    res
}

/// The values offered for filtering on a question.
///
/// The permitted answers come first in catalog order, followed by the other
/// values observed in the responses, sorted. Blank cells are offered as the
/// empty string, which selects them in [`apply_filters`].
pub fn filter_options(
    catalog: &AnswerCatalog,
    responses: &Responses,
    question: &str,
) -> Option<Vec<String>> {
    let observed: BTreeSet<&str> = responses
        .column(question)?
        .map(|c| c.coerced())
        .collect();
    let res = match catalog.permitted(question) {
        Some(permitted) => {
            let mut options = permitted.to_vec();
            options.extend(
                observed
                    .iter()
                    .filter(|o| !permitted.iter().any(|p| p == *o))
                    .map(|o| o.to_string()),
            );
            options
        }
        None => observed.iter().map(|o| o.to_string()).collect(),
    };
    Some(res)
}

/// Walks the demographic questions in order and applies their constraints.
///
/// The options of each question are computed on the rows left by the previous
/// questions. Constraints on other questions are applied last. Demographic
/// questions missing from the responses are skipped.
pub fn demographic_filters(
    catalog: &AnswerCatalog,
    responses: &Responses,
    constraints: &FilterConstraints,
) -> (Vec<FilterDimension>, Responses) {
    let mut dimensions: Vec<FilterDimension> = Vec::new();
    let mut current = responses.clone();
    for question in catalog.demographics() {
        if let Some(options) = filter_options(catalog, &current, question) {
            dimensions.push(FilterDimension {
                question: question.clone(),
                options,
            });
            if constraints.accepted(question).is_some() {
                current = apply_filters(&current, &constraints.only(question));
            }
        } else {
            debug!("demographic_filters: no column for {:?}", question);
        }
    }
    let rest = constraints.without(catalog.demographics());
    if !rest.is_empty() {
        current = apply_filters(&current, &rest);
    }
    (dimensions, current)
}
