use log::debug;
use serde_json::{Map, Value};

use crate::error::{PriceRadarError, Result};

pub type JsonObject = Map<String, Value>;

/// One way of pulling a JSON object out of model output.
#[derive(Clone, Copy)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub parse: fn(&str) -> Option<JsonObject>,
}

/// Tried in order; the first strategy that yields an object wins.
pub const STRATEGIES: [ExtractionStrategy; 3] = [
    ExtractionStrategy {
        name: "direct",
        parse: parse_direct,
    },
    ExtractionStrategy {
        name: "fenced",
        parse: parse_fenced,
    },
    ExtractionStrategy {
        name: "embedded",
        parse: parse_embedded_object,
    },
];

/// Extracts the JSON object carried by a model response.
///
/// Models wrap their answer in prose or markdown fences despite being told
/// not to, so this falls back through [`STRATEGIES`] before giving up with
/// [`PriceRadarError::NoStructuredData`].
pub fn extract_json_object(text: &str) -> Result<JsonObject> {
    for strategy in STRATEGIES.iter() {
        if let Some(object) = (strategy.parse)(text) {
            debug!("Response parsed with '{}' strategy", strategy.name);
            return Ok(object);
        }
    }
    Err(PriceRadarError::NoStructuredData)
}

fn parse_object(candidate: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

pub fn parse_direct(text: &str) -> Option<JsonObject> {
    parse_object(text)
}

/// Parses the body of the first ``` fence, skipping an optional language tag.
pub fn parse_fenced(text: &str) -> Option<JsonObject> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];

    let body = match after_fence.find('\n') {
        Some(newline) if is_language_tag(&after_fence[..newline]) => &after_fence[newline + 1..],
        _ => after_fence,
    };

    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };

    parse_object(body)
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Upper bound on the `{` positions tried by [`parse_embedded_object`].
pub const MAX_EMBEDDED_CANDIDATES: usize = 64;

/// Parses the first balanced `{...}` span in the text that is valid JSON.
///
/// Every `{` is a candidate start, including ones that never close, up to
/// [`MAX_EMBEDDED_CANDIDATES`] of them.
pub fn parse_embedded_object(text: &str) -> Option<JsonObject> {
    let mut from = 0;
    for _ in 0..MAX_EMBEDDED_CANDIDATES {
        let start = from + text.get(from..)?.find('{')?;
        if let Some(end) = balanced_end(text, start) {
            if let Some(object) = parse_object(&text[start..end]) {
                return Some(object);
            }
        }
        from = start + 1;
    }
    None
}

/// End of the brace-balanced span opened at `start`, if it closes.
/// Braces inside string literals are ignored.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}
