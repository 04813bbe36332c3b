//! Bounded page content digest handed to the semantic analyzer

use serde::{Deserialize, Serialize};

/// Text signals extracted from a rendered page.
///
/// The digest is what crosses the boundary to the semantic analyzer, so
/// its text is bounded: [`ContentDigest::truncated`] enforces a byte
/// budget without splitting a UTF-8 character.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentDigest {
    /// Document title, when present
    pub title: Option<String>,
    /// Document language attribute, when present
    pub lang: Option<String>,
    /// Visible text content, in document order
    pub text: String,
}

impl ContentDigest {
    /// Return a copy whose text fits within `max_bytes`, cut at a char
    /// boundary.
    pub fn truncated(&self, max_bytes: usize) -> Self {
        if self.text.len() <= max_bytes {
            return self.clone();
        }

        let mut end = max_bytes;
        while end > 0 && !self.text.is_char_boundary(end) {
            end -= 1;
        }

        Self {
            title: self.title.clone(),
            lang: self.lang.clone(),
            text: self.text[..end].to_string(),
        }
    }
}
