//! Test-case source
//!
//! Cases are either the built-in default list or loaded from a YAML file.
//! The file accepts plain strings or `{ id, text }` entries; ids default to
//! 1-based position.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MrError, MrResult};

/// One input sentence for the MR1 check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestCase {
    pub id: u32,
    pub text: String,
}

impl TestCase {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

/// YAML entry: either a bare sentence or an explicit id/text pair.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaseEntry {
    Text(String),
    Full { id: Option<u32>, text: String },
}

/// Built-in inputs covering positive, negative, and mixed sentiment.
pub fn default_cases() -> Vec<TestCase> {
    [
        "I love this movie",
        "The product was outstanding and exceeded expectations",
        "I do not like this restaurant",
        "The service was okay but the food was great",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| TestCase::new(i as u32 + 1, *text))
    .collect()
}

/// Parse cases from a YAML string.
pub fn from_yaml(yaml: &str) -> MrResult<Vec<TestCase>> {
    let entries: Vec<CaseEntry> = serde_yaml::from_str(yaml)?;
    let mut cases = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let fallback_id = i as u32 + 1;
        let case = match entry {
            CaseEntry::Text(text) => TestCase::new(fallback_id, text),
            CaseEntry::Full { id, text } => TestCase::new(id.unwrap_or(fallback_id), text),
        };
        if case.text.trim().is_empty() {
            return Err(MrError::CaseParse(format!("case {} has empty text", case.id)));
        }
        cases.push(case);
    }
    if cases.is_empty() {
        return Err(MrError::CaseParse("case file contains no cases".into()));
    }
    Ok(cases)
}

/// Load cases from a YAML file.
pub fn load_file(path: &Path) -> MrResult<Vec<TestCase>> {
    let content = std::fs::read_to_string(path)?;
    from_yaml(&content)
}
