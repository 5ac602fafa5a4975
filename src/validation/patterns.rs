use once_cell::sync::Lazy;
use regex::Regex;

/// Injection/XSS signatures screened out of string risk values.
///
/// This is a first line of defense against content-level attacks smuggled
/// through free-form risk inputs; the rendering boundary still owns output
/// encoding. All patterns match case-insensitively.
pub static INJECTION_SIGNATURES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)<\s*script").unwrap(),
            "script tag",
        ),
        (
            Regex::new(r"(?i)javascript\s*:").unwrap(),
            "javascript: URI",
        ),
        (
            Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap(),
            "inline event handler",
        ),
        (
            Regex::new(r"(?i)\beval\s*\(").unwrap(),
            "eval call",
        ),
        (
            Regex::new(r"(?i)\bdocument\s*\.").unwrap(),
            "document object access",
        ),
        (
            Regex::new(r"(?i)\bwindow\s*\.").unwrap(),
            "window object access",
        ),
    ]
});

/// The first signature a string trips, if any.
pub fn find_injection_signature(text: &str) -> Option<&'static str> {
    INJECTION_SIGNATURES
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, label)| *label)
}
