//! Pull structured payloads out of free-form model output.

use regex::Regex;
use std::sync::LazyLock;

static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\w+#-]*\r?\n([\s\S]*?)\r?\n```").unwrap());

/// The span from the first `[` to the last `]`, if any.
///
/// Models wrap JSON in prose and code fences; taking the outermost brackets
/// recovers the array in both cases.
pub fn extract_json_array(text: &str) -> Option<&str> {
    outermost(text, '[', ']')
}

/// The span from the first `{` to the last `}`, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    outermost(text, '{', '}')
}

/// Body of the first fenced code block, or the whole text when there is
/// none. Always trimmed.
pub fn extract_code_block(text: &str) -> &str {
    CODE_BLOCK_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
        .trim()
}

fn outermost(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_inside_prose_and_fences() {
        let text = "Here you go:\n```json\n[{\"id\":\"a\"},{\"id\":\"b\"}]\n```\nEnjoy.";
        assert_eq!(
            extract_json_array(text),
            Some("[{\"id\":\"a\"},{\"id\":\"b\"}]")
        );
    }

    #[test]
    fn no_array() {
        assert_eq!(extract_json_array("I cannot help with that."), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn object_span() {
        assert_eq!(
            extract_json_object("result: {\"a\": {\"b\": 1}} done"),
            Some("{\"a\": {\"b\": 1}}")
        );
    }

    #[test]
    fn first_code_block_wins() {
        let text = "Intro\n```typescript\nconst a = 1;\n```\nmore\n```\nsecond\n```";
        assert_eq!(extract_code_block(text), "const a = 1;");
    }

    #[test]
    fn plain_text_is_returned_trimmed() {
        assert_eq!(extract_code_block("\n  def test_x(): pass \n"), "def test_x(): pass");
    }
}
