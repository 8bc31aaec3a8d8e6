use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Prefix for branches that carry generated tests.
pub const TEST_BRANCH_PREFIX: &str = "ai-generated-tests";

static UNSAFE_FILENAME_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9._-]").unwrap());

static REPEATED_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

static BRANCH_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._/-]+$").unwrap());

/// Build a branch name that will not collide with earlier runs:
/// `<prefix>-<YYYY-MM-DDTHH-MM-SS>-<6 random base36 chars>`.
pub fn generate_branch_name(prefix: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.format("%Y-%m-%dT%H-%M-%S");
    format!("{prefix}-{timestamp}-{}", random_suffix(6))
}

/// Replace anything outside `[a-zA-Z0-9._-]` with `_`, collapse runs of
/// underscores and trim them from both ends.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = UNSAFE_FILENAME_CHARS_RE.replace_all(name, "_");
    let collapsed = REPEATED_UNDERSCORE_RE.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

pub fn is_valid_branch_name(name: &str) -> bool {
    BRANCH_NAME_RE.is_match(name)
}

fn random_suffix(len: usize) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    uuid::Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(len)
        .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn branch_name_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let name = generate_branch_name(TEST_BRANCH_PREFIX, now);
        assert!(name.starts_with("ai-generated-tests-2024-03-09T14-05-07-"));
        let suffix = name.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(is_valid_branch_name(&name));
    }

    #[test]
    fn branch_names_do_not_repeat_within_one_second() {
        let now = Utc::now();
        let names: HashSet<String> = (0..500)
            .map(|_| generate_branch_name("t", now))
            .collect();
        assert_eq!(names.len(), 500);
    }

    #[test]
    fn sanitize_replaces_and_collapses() {
        assert_eq!(sanitize_filename("my test (1).js"), "my_test_1_.js");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("__a b__"), "a_b");
        assert_eq!(sanitize_filename("util.test.ts"), "util.test.ts");
    }

    #[test]
    fn branch_name_validation() {
        assert!(is_valid_branch_name("feature/tests-1.2"));
        assert!(!is_valid_branch_name("has space"));
        assert!(!is_valid_branch_name(""));
        assert!(!is_valid_branch_name("semi;colon"));
    }
}
