use crate::error::{ReasonerError, SpecialistError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Envelope the claude CLI wraps its answer in with `--output-format json`
#[derive(Deserialize)]
struct ClaudeEnvelope {
    result: String,
    #[serde(default)]
    is_error: bool,
}

/// Decode raw reasoner output into a typed, schema-checked result
pub fn decode_output<T: DeserializeOwned>(raw: &str) -> Result<T, SpecialistError> {
    let trimmed = raw.trim();

    let text = match serde_json::from_str::<ClaudeEnvelope>(trimmed) {
        Ok(envelope) if envelope.is_error => {
            return Err(ReasonerError::Rejected(envelope.result).into());
        }
        Ok(envelope) => envelope.result,
        Err(_) => trimmed.to_string(),
    };

    let json = extract_json(&text).ok_or(SpecialistError::NoJson)?;
    serde_json::from_str::<T>(&json).map_err(|e| SpecialistError::Schema(e.to_string()))
}

/// Extract a JSON object from text that may wrap it in prose or a code block
pub fn extract_json(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.starts_with('{') && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Some(trimmed.to_string());
    }

    let re = regex::Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").ok()?;
    for cap in re.captures_iter(s) {
        let potential_json = cap.get(1)?.as_str().trim();
        if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
            return Some(potential_json.to_string());
        }
    }

    // Balanced-brace scan from the first '{', skipping braces inside strings
    let brace_start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[brace_start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &s[brace_start..brace_start + i + 1];
                    return serde_json::from_str::<serde_json::Value>(candidate)
                        .ok()
                        .map(|_| candidate.to_string());
                }
            }
            _ => {}
        }
    }

    None
}
