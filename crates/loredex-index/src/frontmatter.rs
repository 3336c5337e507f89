//! Frontmatter parsing and summary extraction
//!
//! The header grammar is deliberately loose: a `---`-delimited block of
//! scalar `key: value` lines. Lines without a colon are skipped, and a
//! document without a header is simply a document with no declared
//! metadata. Strict YAML would reject files the scanners must accept.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Maximum length of an auto-extracted description
pub const MAX_SUMMARY_LENGTH: usize = 200;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---").unwrap())
}

fn strip_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^---\s*\n.*?\n---\s*\n?").unwrap())
}

/// Parse the metadata header at the top of a document.
///
/// Returns the declared key/value pairs, or an empty map when no
/// header block is present. Keys and values are trimmed; a value
/// wrapped in one matching pair of `"` or `'` has the quotes stripped.
pub fn parse_frontmatter(content: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    let Some(captures) = header_re().captures(content) else {
        return fields;
    };
    let block = captures.get(1).map(|m| m.as_str()).unwrap_or("");

    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), strip_quotes(value.trim()).to_string());
    }

    fields
}

/// Extract a short summary from the document body.
///
/// Used when no `description` is declared: the first paragraph after
/// the header that is non-empty and not a code fence, with leading
/// heading markers stripped, truncated to `max_length` characters with
/// a `...` marker. Returns an empty string if nothing qualifies.
pub fn extract_summary(content: &str, max_length: usize) -> String {
    let body = strip_header_re().replace(content, "");

    for paragraph in body.split("\n\n") {
        let cleaned = paragraph.trim().trim_start_matches('#').trim_start();
        if cleaned.is_empty() || cleaned.starts_with("```") {
            continue;
        }
        if cleaned.chars().count() > max_length {
            let truncated: String = cleaned.chars().take(max_length).collect();
            return format!("{truncated}...");
        }
        return cleaned.to_string();
    }

    String::new()
}

/// Split a comma-separated tag value into individual tags
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a declared tool list.
///
/// Accepts a bracketed list, single- or double-quoted; tries JSON
/// after normalizing quotes, then falls back to a comma split with
/// quote stripping. Anything unbracketed yields no tools.
pub fn parse_tool_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return Vec::new();
    }

    let normalized = trimmed.replace('\'', "\"");
    if let Ok(tools) = serde_json::from_str::<Vec<String>>(&normalized) {
        return tools;
    }

    trimmed[1..trimmed.len() - 1]
        .split(',')
        .map(|t| strip_quotes(t.trim()).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strip one matching pair of surrounding quotes, if present
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
