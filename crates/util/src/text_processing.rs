//! # Text Processing Utilities
//!
//! Redaction of credential-looking values before they reach logs or tool
//! results, and truncation of response bodies for error previews.

use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Redacts values that look like secrets in a string.
///
/// Covers `Authorization` headers, bearer tokens, Prefect Cloud API keys
/// (`pnu_`/`pnb_` prefixes) and `KEY=value` / `"secret": "value"` style
/// assignments whose key names a credential.
///
/// # Example
/// ```rust
/// use prefect_mcp_util::text_processing::redact_sensitive;
///
/// let redacted = redact_sensitive("PREFECT_API_KEY=pnu_abcdefghijklmnopqrstuvwxyz0123456789");
/// assert_eq!(redacted, "PREFECT_API_KEY=[REDACTED]");
///
/// let redacted = redact_sensitive("Authorization: Bearer secret123");
/// assert_eq!(redacted, "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in get_redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                if captures.get(2).is_some() {
                    format!("{prefix}{REDACTED}{suffix}")
                } else {
                    REDACTED.to_string()
                }
            })
            .to_string();
    }

    redacted
}

/// Collapse whitespace and cut `text` to roughly `limit` bytes for previews.
pub fn truncate_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

fn get_redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    let keywords = "KEY|TOKEN|SECRET|PASSWORD|PASSPHRASE|CREDENTIALS";
    let shell_assignment = format!(r"(?i)((?:export\s+)?[A-Za-z0-9_]*?(?:{keywords})[A-Za-z0-9_]*\s*=\s*)([^\s]+)");
    let json_assignment = format!("(?i)(\"[A-Za-z0-9_.-]*?(?:{keywords})[A-Za-z0-9_.-]*\"\\s*:\\s*\")([^\"]+)(\")");

    [
        r"(?i)(authorization:\s+)([^\s]+(?:\s+[^\s]+)?)",
        r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
        r"(pn[ub]_[A-Za-z0-9]{20,})",
        shell_assignment.as_str(),
        json_assignment.as_str(),
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}
