//! GitHub file content encoding and file-type filters.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("file content is not valid UTF-8")]
    NotUtf8,
}

const CODE_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".py", ".java", ".cpp", ".c", ".cs", ".go", ".php", ".rb",
    ".swift", ".kt", ".scala", ".rust", ".vue", ".html", ".css", ".scss", ".sass", ".less",
    ".sql", ".sh", ".bash", ".ps1", ".json", ".xml", ".yaml", ".yml", ".md", ".txt",
];

const EXTRA_TEXT_EXTENSIONS: &[&str] = &[".dockerfile", ".gitignore", ".env"];

/// Decode the `content` field of a GitHub contents response.
///
/// GitHub wraps the base64 payload at 60 columns, so whitespace is stripped
/// before decoding.
pub fn decode_github_content(encoded: &str) -> Result<String, ContentError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    String::from_utf8(bytes).map_err(|_| ContentError::NotUtf8)
}

/// Encode text for a contents PUT.
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Whether a file name looks like source code worth offering for tests.
pub fn is_code_file(name: &str) -> bool {
    last_dot_ext(name).is_some_and(|ext| CODE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether a file name looks like plain text.
pub fn is_text_file(name: &str) -> bool {
    last_dot_ext(name).is_some_and(|ext| {
        CODE_EXTENSIONS.contains(&ext.as_str()) || EXTRA_TEXT_EXTENSIONS.contains(&ext.as_str())
    })
}

// Unlike `framework::file_extension`, dotfiles count: `.gitignore` -> `.gitignore`.
fn last_dot_ext(name: &str) -> Option<String> {
    name.rfind('.').map(|idx| name[idx..].to_ascii_lowercase())
}
