//! Test summaries: the structured description of a proposed test case.
//!
//! AI providers return loosely-shaped JSON, and clients echo summaries back
//! to us. Both go through [`RawSummary`] and [`check_summary`], which turns a
//! candidate into either a typed [`TestSummary`] or a rejection reason.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Enums ──────────────────────────────────────────────────────────────────

/// Kind of test a summary proposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum TestType {
    Unit,
    Integration,
    E2e,
    Performance,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::E2e => "e2e",
            Self::Performance => "performance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unit" => Some(Self::Unit),
            "integration" => Some(Self::Integration),
            "e2e" => Some(Self::E2e),
            "performance" => Some(Self::Performance),
            _ => None,
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(Self::Simple),
            "medium" => Some(Self::Medium),
            "complex" => Some(Self::Complex),
            _ => None,
        }
    }
}

// ─── Summary ────────────────────────────────────────────────────────────────

/// A validated test summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TestSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    /// Repository path of the source file the test targets.
    pub file: String,
    pub priority: Priority,
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// An unvalidated summary candidate.
///
/// Every field is optional so that partial AI output and client payloads can
/// be inspected field by field instead of failing deserialization wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RawSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub test_type: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub complexity: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl RawSummary {
    /// Read a candidate from arbitrary JSON. Numbers are accepted where
    /// strings are expected (models often emit `"id": 1`).
    pub fn from_value(value: &serde_json::Value) -> Self {
        let field = |key: &str| -> Option<String> {
            match value.get(key)? {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            }
        };
        Self {
            id: field("id"),
            title: field("title"),
            description: field("description"),
            test_type: field("type"),
            file: field("file"),
            priority: field("priority"),
            complexity: field("complexity"),
            framework: field("framework"),
            created_at: field("createdAt"),
        }
    }

    /// Fill the fields a model commonly omits with safe values.
    ///
    /// `index` is the zero-based position in the model's output and seeds the
    /// generated id. Description, type and file are never defaulted.
    pub fn with_defaults(mut self, index: usize) -> Self {
        if blank(&self.id) {
            self.id = Some(format!("test-{}", index + 1));
        }
        if blank(&self.title) {
            self.title = Some("Untitled Test".to_string());
        }
        if blank(&self.priority) {
            self.priority = Some(Priority::default().as_str().to_string());
        }
        if blank(&self.complexity) {
            self.complexity = Some(Complexity::default().as_str().to_string());
        }
        self
    }
}

impl From<TestSummary> for RawSummary {
    fn from(s: TestSummary) -> Self {
        Self {
            id: Some(s.id),
            title: Some(s.title),
            description: Some(s.description),
            test_type: Some(s.test_type.as_str().to_string()),
            file: Some(s.file),
            priority: Some(s.priority.as_str().to_string()),
            complexity: Some(s.complexity.as_str().to_string()),
            framework: s.framework,
            created_at: s.created_at,
        }
    }
}

// ─── Validation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryRejection {
    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
    #[error("Invalid test type: {0}")]
    InvalidType(String),
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),
    #[error("Invalid complexity: {0}")]
    InvalidComplexity(String),
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryCheck {
    Valid(TestSummary),
    Invalid {
        candidate: RawSummary,
        reason: SummaryRejection,
    },
}

impl SummaryCheck {
    pub fn into_valid(self) -> Option<TestSummary> {
        match self {
            Self::Valid(s) => Some(s),
            Self::Invalid { .. } => None,
        }
    }
}

/// Validate a candidate summary.
///
/// `id`, `title`, `description`, `type` and `file` must be present and
/// non-blank, `type` must be a known [`TestType`]. `priority` and
/// `complexity` fall back to `medium` when absent but are rejected when set
/// to an unknown value.
pub fn check_summary(raw: RawSummary) -> SummaryCheck {
    match validate(&raw) {
        Ok(summary) => SummaryCheck::Valid(summary),
        Err(reason) => SummaryCheck::Invalid {
            candidate: raw,
            reason,
        },
    }
}

/// Like [`check_summary`] but returns a `Result`, for callers that treat a
/// bad summary as a request error.
pub fn validate_summary(raw: &RawSummary) -> Result<TestSummary, SummaryRejection> {
    validate(raw)
}

fn validate(raw: &RawSummary) -> Result<TestSummary, SummaryRejection> {
    let required: [(&'static str, &Option<String>); 5] = [
        ("id", &raw.id),
        ("title", &raw.title),
        ("description", &raw.description),
        ("type", &raw.test_type),
        ("file", &raw.file),
    ];
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, v)| blank(v))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(SummaryRejection::MissingFields { fields: missing });
    }

    let type_str = text(&raw.test_type);
    let test_type =
        TestType::parse(type_str).ok_or_else(|| SummaryRejection::InvalidType(type_str.into()))?;

    let priority = match raw.priority.as_deref().map(str::trim) {
        None | Some("") => Priority::default(),
        Some(p) => Priority::parse(p).ok_or_else(|| SummaryRejection::InvalidPriority(p.into()))?,
    };
    let complexity = match raw.complexity.as_deref().map(str::trim) {
        None | Some("") => Complexity::default(),
        Some(c) => {
            Complexity::parse(c).ok_or_else(|| SummaryRejection::InvalidComplexity(c.into()))?
        }
    };

    Ok(TestSummary {
        id: text(&raw.id).to_string(),
        title: text(&raw.title).to_string(),
        description: text(&raw.description).to_string(),
        test_type,
        file: text(&raw.file).to_string(),
        priority,
        complexity,
        framework: raw.framework.clone().filter(|f| !f.trim().is_empty()),
        created_at: raw.created_at.clone(),
    })
}

fn blank(v: &Option<String>) -> bool {
    v.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn text(v: &Option<String>) -> &str {
    v.as_deref().map(str::trim).unwrap_or_default()
}
