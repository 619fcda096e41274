//! Compliance rule engine.
//!
//! Every entity exposes an explicit, ordered list of pure rule functions.
//! The driver runs all of them and aggregates the resulting [`Violation`]s;
//! it never stops at the first failure, so a single validation pass reports
//! everything the authority would reject.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

mod breakdown;
mod parties;
mod record;

/// A single violated compliance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Stable rule identifier (e.g. `breakdown.tax-amount-tolerance`).
    pub rule: &'static str,
    /// Field name(s) the rule applies to.
    pub fields: Vec<&'static str>,
    /// Human-readable description of the failed condition.
    pub message: String,
    /// Expected value, where the rule is numeric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value, where the rule is numeric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Violation {
    /// Creates a violation for a single field.
    pub fn new(rule: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            fields: vec![field],
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Creates a violation spanning several fields.
    pub fn spanning(
        rule: &'static str,
        fields: &[&'static str],
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            fields: fields.to_vec(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Creates a numeric violation carrying expected and actual values.
    pub fn numeric(
        rule: &'static str,
        field: &'static str,
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            fields: vec![field],
            message: message.into(),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        }
    }

    /// Creates a violation for a value that does not match its required pattern.
    pub fn pattern(rule: &'static str, field: &'static str, value: &str) -> Self {
        Self {
            rule,
            fields: vec![field],
            message: format!("'{value}' does not match the required format"),
            expected: None,
            actual: Some(value.to_string()),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule, self.fields.join(", "), self.message)?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (expected {expected}, got {actual})")?;
        }
        Ok(())
    }
}

/// Error aggregating every compliance rule an entity violates.
#[derive(Debug, Error)]
#[error("{}", render(.violations))]
pub struct ValidationError {
    /// All violated rules, in rule-list order.
    pub violations: Vec<Violation>,
}

fn render(violations: &[Violation]) -> String {
    let lines: Vec<String> = violations.iter().map(|v| format!("- {v}")).collect();
    format!(
        "{} compliance rule violation(s):\n{}",
        violations.len(),
        lines.join("\n")
    )
}

/// Capability interface for entities that carry compliance rules.
///
/// `check` appends violations without short-circuiting; `validate` is the
/// caller-facing driver. Validation is read-only and repeatable.
pub trait Validate {
    /// Runs every rule for this entity, appending violations to `out`.
    fn check(&self, out: &mut Vec<Violation>);

    /// Runs all rules and fails with the full violation list if any fired.
    fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        self.check(&mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// Checks a wire amount against an expected value within the given
/// tolerance steps, comparing in the authority's two-decimal rendering so
/// that float noise cannot widen the window.
pub(crate) fn matches_within(actual: &str, expected: f64, steps: &[f64]) -> bool {
    steps
        .iter()
        .any(|step| format!("{:.2}", expected + step) == actual)
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
