//! Typed shape of the analyze-file reply.
//!
//! The same types back the schema block in the prompt (checked by tests) and the
//! parser for the model's reply, so the two cannot drift apart silently.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MAX_SUGGESTED_NAME_CHARS: usize = 50;
pub const MIN_TAGS: usize = 3;
pub const MAX_TAGS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Invoice,
    Contract,
    Report,
    Email,
    Presentation,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entities {
    /// ISO dates (`YYYY-MM-DD`).
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub companies: Vec<String>,
    pub people: Vec<String>,
    pub custom: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub doc_type: DocType,
    pub suggested_name: String,
    pub suggested_path: String,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: String,
    pub confidence: f64,
}

#[cfg(test)]
impl AnalysisResult {
    /// Top-level reply keys, in the order the prompt lists them.
    pub const FIELDS: [&'static str; 7] = [
        "doc_type",
        "suggested_name",
        "suggested_path",
        "entities",
        "tags",
        "summary",
        "confidence",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaValidation {
    pub passed: bool,
    pub violations: Vec<SchemaViolation>,
}

/// Checks a parsed reply against the constraints the prompt asks for.
///
/// Violations are reported, never corrected.
pub fn validate_analysis(result: &AnalysisResult) -> SchemaValidation {
    let mut violations = Vec::new();
    let mut flag = |field: &str, reason: String| {
        violations.push(SchemaViolation {
            field: field.to_string(),
            reason,
        })
    };

    let name = result.suggested_name.as_str();
    let name_chars = name.chars().count();
    if name.trim().is_empty() {
        flag("suggested_name", "is empty".to_string());
    } else if name_chars > MAX_SUGGESTED_NAME_CHARS {
        flag(
            "suggested_name",
            format!("is {name_chars} chars, max {MAX_SUGGESTED_NAME_CHARS}"),
        );
    }
    if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
        flag("suggested_name", format!("contains disallowed character {bad:?}"));
    }

    if !(MIN_TAGS..=MAX_TAGS).contains(&result.tags.len()) {
        flag(
            "tags",
            format!(
                "has {} tags, expected {MIN_TAGS}-{MAX_TAGS}",
                result.tags.len()
            ),
        );
    }

    if !(0.0..=1.0).contains(&result.confidence) {
        flag(
            "confidence",
            format!("{} is outside [0, 1]", result.confidence),
        );
    }

    for date in &result.entities.dates {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            flag("entities.dates", format!("{date:?} is not an ISO date"));
        }
    }

    SchemaValidation {
        passed: violations.is_empty(),
        violations,
    }
}

/// Rewrites a name into the allowed alphabet and length.
///
/// Disallowed characters (including whitespace and `.`) become `_`.
pub fn sanitize_suggested_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if is_name_char(c) { c } else { '_' })
        .take(MAX_SUGGESTED_NAME_CHARS)
        .collect()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
