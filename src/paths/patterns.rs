use std::sync::OnceLock;

use regex::{Captures, Regex};

fn file_expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"file\(([^)]+)\)").expect("invalid file() regex"))
}

fn alias_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_-]+:\S*$").expect("invalid alias regex"))
}

/// Collect the trimmed inner values of every `file(...)` expression found in `text`.
///
/// Paths may contain spaces; blank expressions are skipped.
pub fn file_expressions(text: &str) -> Vec<&str> {
    file_expression_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .filter(|inner| !inner.is_empty())
        .collect()
}

/// Returns `true` when `text` contains at least one `file(...)` expression.
pub fn has_file_expression(text: &str) -> bool {
    file_expression_pattern().is_match(text)
}

/// Replace every `file(...)` expression in `text` with `file(<rewrite(inner)>)`.
///
/// Text outside the expressions is left untouched.
pub fn rewrite_file_expressions(text: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
    file_expression_pattern()
        .replace_all(text, |caps: &Captures| format!("file({})", rewrite(caps[1].trim())))
        .into_owned()
}

/// Return `text` when the whole value looks like a `namespace:rest` content identifier.
pub fn alias_identifier(text: &str) -> Option<&str> {
    alias_pattern().is_match(text).then_some(text)
}
