//! Pull-request bookkeeping for generated test files.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PR_TITLE: &str = "Add AI-generated test cases";
pub const DEFAULT_PR_DESCRIPTION: &str =
    "This PR adds test cases generated by the Test Case Generator application.";

/// Directory generated tests are committed under.
pub const TEST_DIR: &str = "tests";

/// A test file written to the pull-request branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CreatedFile {
    pub file_name: String,
    pub path: String,
    pub sha: String,
    pub html_url: Option<String>,
}

/// A test file that could not be written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FileWriteError {
    pub file_name: String,
    pub error: String,
}

/// Repository path for a (sanitized) test file name.
pub fn test_file_path(sanitized_name: &str) -> String {
    format!("{TEST_DIR}/{sanitized_name}")
}

pub fn commit_message(sanitized_name: &str) -> String {
    format!("Add test file: {sanitized_name}")
}

/// Markdown body listing what was written and what failed.
pub fn build_pr_body(
    description: &str,
    total: usize,
    created: &[CreatedFile],
    errors: &[FileWriteError],
) -> String {
    let mut body = format!("{description}\n\n## Generated Test Files\n\n");
    body.push_str(
        &created
            .iter()
            .map(|f| format!("- `{}`", f.path))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    body.push_str(&format!(
        "\n\n## Summary\n- Total files: {total}\n- Successfully created: {}\n- Failed: {}",
        created.len(),
        errors.len()
    ));
    if !errors.is_empty() {
        body.push_str("\n\n## Errors\n");
        body.push_str(
            &errors
                .iter()
                .map(|e| format!("- {}: {}", e.file_name, e.error))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(path: &str) -> CreatedFile {
        CreatedFile {
            file_name: path.trim_start_matches("tests/").into(),
            path: path.into(),
            sha: "abc".into(),
            html_url: None,
        }
    }

    #[test]
    fn body_lists_files_and_counts() {
        let body = build_pr_body(
            DEFAULT_PR_DESCRIPTION,
            2,
            &[created("tests/a.test.js"), created("tests/b.test.js")],
            &[],
        );
        assert!(body.starts_with(DEFAULT_PR_DESCRIPTION));
        assert!(body.contains("- `tests/a.test.js`\n- `tests/b.test.js`"));
        assert!(body.contains("- Total files: 2\n- Successfully created: 2\n- Failed: 0"));
        assert!(!body.contains("## Errors"));
    }

    #[test]
    fn body_includes_errors_section_when_something_failed() {
        let body = build_pr_body(
            "desc",
            2,
            &[created("tests/a.test.js")],
            &[FileWriteError {
                file_name: "b.test.js".into(),
                error: "File already exists or invalid content".into(),
            }],
        );
        assert!(body.contains("## Errors\n- b.test.js: File already exists or invalid content"));
    }

    #[test]
    fn paths_and_messages() {
        assert_eq!(test_file_path("x.test.ts"), "tests/x.test.ts");
        assert_eq!(commit_message("x.test.ts"), "Add test file: x.test.ts");
    }
}
