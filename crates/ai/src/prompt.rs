//! Prompt templates.

use testgen_api::FileContent;
use testgen_core::TestSummary;
use testgen_core::framework::file_extension;

pub const SYSTEM_PROMPT: &str =
    "You are a senior test engineer with expertise in various testing frameworks and best practices.";

fn fence_lang(path: &str) -> &str {
    file_extension(path).trim_start_matches('.')
}

/// Ask for a JSON array of test-case summaries covering `files`.
pub fn summaries_prompt(files: &[FileContent]) -> String {
    let file_contents = files
        .iter()
        .map(|f| {
            format!(
                "File: {}\n```{}\n{}\n```",
                f.path,
                fence_lang(&f.path),
                f.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a senior test engineer. Analyze the following code files and generate a comprehensive list of test case summaries.

For each file, identify:
1. Unit test cases for individual functions/methods
2. Integration test cases for component interactions
3. Edge cases and error handling scenarios
4. Performance test considerations (if applicable)

{file_contents}

Please provide your response as a JSON array of test case summaries. Each summary should have:
- id: unique identifier
- title: brief descriptive title
- description: detailed description of what the test should verify
- type: "unit", "integration", "e2e", or "performance"
- file: the source file this test relates to
- priority: "high", "medium", or "low"
- complexity: "simple", "medium", or "complex"

Example format:
[
  {{
    "id": "test-1",
    "title": "Should validate user input",
    "description": "Test that the validateUser function correctly validates required fields and returns appropriate error messages for invalid inputs",
    "type": "unit",
    "file": "src/utils/validation.js",
    "priority": "high",
    "complexity": "simple"
  }}
]

Generate 5-10 meaningful test case summaries covering the most important functionality.
"#
    )
}

/// Ask for a complete test file implementing `summary` against `source`.
pub fn test_code_prompt(summary: &TestSummary, source: &str, framework: &str) -> String {
    format!(
        r#"You are a senior test engineer. Generate complete, runnable test code based on the following specification:

Test Case: {title}
Description: {description}
Type: {test_type}
Target File: {file}
Framework: {framework}

Source Code:
```{lang}
{source}
```

Requirements:
1. Generate complete, runnable test code using {framework}
2. Include necessary imports and setup
3. Cover positive, negative, and edge cases
4. Follow best practices for {framework}
5. Add descriptive test names and comments
6. Include mock data where appropriate
7. Test error handling scenarios

For JavaScript/TypeScript files, use Jest/Vitest syntax.
For Python files, use pytest.
For Java files, use JUnit 5.
For other languages, use the most appropriate testing framework.

Provide the complete test file content with proper file naming convention.
"#,
        title = summary.title,
        description = summary.description,
        test_type = summary.test_type,
        file = summary.file,
        lang = fence_lang(&summary.file),
    )
}
