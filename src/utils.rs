use crate::error::{ClientError, ClientResult};

/// Case-insensitive check that `filename` ends with `.<ext>` for one of `allowed`
pub fn has_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
    let lower = filename.to_lowercase();
    allowed
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())))
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> ClientResult<()> {
    match has_allowed_extension(filename, allowed) {
        true => Ok(()),
        false => Err(ClientError::Validation(format!(
            "Please select a {} file",
            allowed
                .iter()
                .map(|ext| ext.to_uppercase())
                .collect::<Vec<_>>()
                .join(" or ")
        ))),
    }
}

/// Escape text for safe inclusion in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// First 8 characters of a job id, used in export file names.
pub fn short_job_id(job_id: &str) -> &str {
    match job_id.char_indices().nth(8) {
        Some((byte_idx, _)) => &job_id[..byte_idx],
        None => job_id,
    }
}

/// Returns `fallback` when `value` is empty.
pub fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
