use std::sync::LazyLock;

use regex::Regex;

/// Candidate extensions tried, in order, when an asset stored under a guessed
/// `.jpg` name answers 404.
pub const FALLBACK_EXTENSIONS: [&str; 4] = [".jpg", ".png", ".webm", ".gif"];

/// Extension assumed for links whose real media type is unknown until fetched.
pub const DEFAULT_EXTENSION: &str = ".jpg";

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digits regex"));

/// Windows-safe filename for a path segment taken from a remote URL.
///
/// Returns `None` when nothing usable is left after cleaning.
pub fn sanitize_file_name(input: &str) -> Option<String> {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return None;
    }

    let (stem, ext) = split_extension(cleaned);
    if is_reserved_windows_name(stem) {
        return Some(format!("{stem}_{ext}"));
    }
    Some(cleaned.to_string())
}

/// Last non-empty path segment of `url`, ignoring query and fragment.
pub fn last_path_segment(url: &str) -> Option<&str> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let path = without_fragment.split('?').next().unwrap_or(without_fragment);
    path.rsplit('/').find(|segment| !segment.is_empty())
}

/// `{digits}.jpg` from the first run of digits in the URL's last path segment.
pub fn numeric_file_name(url: &str) -> Option<String> {
    let segment = last_path_segment(url)?;
    let id = DIGITS_RE.find(segment)?;
    Some(format!("{}{DEFAULT_EXTENSION}", id.as_str()))
}

/// Extension of `name` including the leading dot, or an empty string.
pub fn extension_of(name: &str) -> &str {
    split_extension(name).1
}

/// Replace a trailing `from` extension with `to`. Leaves `value` untouched
/// when it does not end with `from`.
pub fn swap_extension(value: &str, from: &str, to: &str) -> String {
    match value.strip_suffix(from) {
        Some(stem) => format!("{stem}{to}"),
        None => value.to_string(),
    }
}

/// Position of `extension` in [`FALLBACK_EXTENSIONS`].
pub fn fallback_position(extension: &str) -> Option<usize> {
    FALLBACK_EXTENSIONS
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(extension))
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
