use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A label followed by one or two alphabetic labels of 2+ characters
    static ref DOMAIN_REGEX: Regex =
        Regex::new(r"[a-zA-Z0-9-]+(?:\.[a-zA-Z]{2,}){1,2}").unwrap();

    static ref SCHEME_REGEX: Regex = Regex::new(r"^https?://").unwrap();
}

/// Pull candidate domains out of free-form text.
///
/// Purely syntactic: no TLD validation, no case folding. Duplicates are
/// dropped, keeping the first occurrence's position. An empty result is the
/// empty-input condition; callers should not start a batch for it.
pub fn extract_domains(text: &str) -> Vec<String> {
    DOMAIN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Strip a leading `http://`/`https://` and one trailing slash.
pub fn clean_url(url: &str) -> String {
    let without_scheme = SCHEME_REGEX.replace(url, "");
    without_scheme
        .strip_suffix('/')
        .unwrap_or(&without_scheme)
        .to_string()
}
