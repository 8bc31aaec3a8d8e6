//! Testing-framework rules keyed by source file extension.

use std::collections::BTreeMap;

/// Extension of `path` including the leading dot, or `""` when the final
/// path segment has none.
pub fn file_extension(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

/// Pick a testing framework for a source file.
pub fn detect_framework(path: &str) -> &'static str {
    match file_extension(path).to_ascii_lowercase().as_str() {
        ".js" | ".jsx" | ".ts" | ".tsx" => "jest",
        ".py" => "pytest",
        ".java" => "junit",
        ".cs" => "xunit",
        ".go" => "testing",
        ".php" => "phpunit",
        ".rb" => "rspec",
        _ => "jest",
    }
}

/// Conventional test file name for `source_path` under `framework`.
///
/// ```text
/// jest / vitest  src/util.ts  -> util.test.ts
/// pytest         app/core.py  -> test_core.py
/// junit          Main.java    -> MainTest.java
/// other          main.go      -> main_test.go
/// ```
pub fn test_file_name(source_path: &str, framework: &str) -> String {
    let ext = file_extension(source_path);
    let name = source_path.rsplit('/').next().unwrap_or(source_path);
    let base = name.strip_suffix(ext).unwrap_or(name);

    match framework {
        "jest" | "vitest" => format!("{base}.test{ext}"),
        "pytest" => format!("test_{base}.py"),
        "junit" => format!("{}Test.java", capitalize(base)),
        _ => format!("{base}_test{ext}"),
    }
}

const SUPPORTED: &[(&str, &[&str])] = &[
    ("javascript", &["jest", "vitest", "mocha", "jasmine"]),
    ("typescript", &["jest", "vitest", "mocha"]),
    ("python", &["pytest", "unittest", "nose2"]),
    ("java", &["junit", "testng"]),
    ("csharp", &["xunit", "nunit", "mstest"]),
    ("go", &["testing", "ginkgo"]),
    ("php", &["phpunit", "codeception"]),
    ("ruby", &["rspec", "minitest"]),
];

/// Frameworks offered per language.
pub fn supported_frameworks() -> BTreeMap<&'static str, &'static [&'static str]> {
    SUPPORTED.iter().copied().collect()
}

/// Default framework for each recognised extension.
pub fn default_frameworks() -> BTreeMap<&'static str, &'static str> {
    [".js", ".jsx", ".ts", ".tsx", ".py", ".java", ".cs", ".go", ".php", ".rb"]
        .into_iter()
        .map(|ext| (ext, detect_framework(&format!("file{ext}"))))
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
