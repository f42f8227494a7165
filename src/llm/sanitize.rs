//! Response sanitizer — fence stripping and script-span extraction.

use regex::Regex;
use std::sync::OnceLock;

pub const OPENING_MARKER: &str = "tell application";
pub const CLOSING_MARKER: &str = "end tell";

fn fence_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)```applescript\n?").expect("static regex"),
            Regex::new(r"(?i)```osascript\n?").expect("static regex"),
            Regex::new(r"```\n?").expect("static regex"),
        ]
    })
}

/// Strip markdown code fences from model output.
pub fn strip_code_fences(raw: &str) -> String {
    fence_patterns()
        .iter()
        .fold(raw.trim().to_string(), |text, re| {
            re.replace_all(&text, "").into_owned()
        })
}

/// Extract the script from raw model output.
///
/// Keeps the span from the first opening marker to the end of the last
/// closing marker. When either marker is missing (or they are out of
/// order) the fence-stripped text comes back unbounded; `validate` decides
/// what to do with it. Prose after the script that itself says "end tell"
/// ends up inside the span.
pub fn sanitize(raw: &str) -> String {
    let text = strip_code_fences(raw);
    match (text.find(OPENING_MARKER), text.rfind(CLOSING_MARKER)) {
        (Some(start), Some(end)) if end > start => {
            text[start..end + CLOSING_MARKER.len()].trim().to_string()
        }
        _ => text.trim().to_string(),
    }
}

/// True when the text carries both script markers.
pub fn validate(script: &str) -> bool {
    script.contains(OPENING_MARKER) && script.contains(CLOSING_MARKER)
}
