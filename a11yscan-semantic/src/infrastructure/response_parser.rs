//! JSON extraction from model responses.
//!
//! Model output rarely arrives as bare JSON: the payload tends to be
//! wrapped in markdown fences or surrounded by narrative prose. Parsing
//! walks a short chain of increasingly forgiving extractions and
//! deserializes the first candidate that yields the expected shape.

use serde::de::DeserializeOwned;

use crate::domain::SemanticError;

pub struct ResponseParser;

impl ResponseParser {
    /// Deserialize a `T` out of a raw model response.
    ///
    /// Candidates are tried in order: the whole trimmed response, a
    /// fence tagged `json`, any fence, and finally the first balanced
    /// JSON object or array embedded in prose.
    pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, SemanticError> {
        let trimmed = content.trim();
        let candidates = [
            Some(trimmed),
            fenced_block(trimmed, Some("json")),
            fenced_block(trimmed, None),
            embedded_json(trimmed),
        ];

        candidates
            .into_iter()
            .flatten()
            .find_map(|candidate| serde_json::from_str(candidate).ok())
            .ok_or_else(|| {
                SemanticError::InvalidResponse(
                    "no parseable JSON in model response".to_string(),
                )
            })
    }
}

/// Body of the first fenced code block, optionally requiring a language
/// tag on the opening fence.
fn fenced_block<'a>(content: &'a str, language: Option<&str>) -> Option<&'a str> {
    let fence = "```";
    let mut search = content;

    loop {
        let start = search.find(fence)?;
        let after = &search[start + fence.len()..];
        let newline = after.find('\n')?;
        let tag = after[..newline].trim();
        let body = &after[newline + 1..];

        if let Some(expected) = language
            && !tag.eq_ignore_ascii_case(expected)
        {
            search = body;
            continue;
        }

        let end = body.find(fence)?;
        return Some(body[..end].trim());
    }
}

/// First balanced JSON object or array in free-form text.
///
/// Tracks string and escape state so brackets inside string literals do
/// not affect the nesting depth.
fn embedded_json(content: &str) -> Option<&str> {
    let start = content.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in content.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&content[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
