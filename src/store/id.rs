use std::fmt;

use uuid::Uuid;

use super::Document;

/// Canonical record identifier.
///
/// Every textual form of a UUID (hyphenated, simple, braced, urn, any case)
/// normalizes to the lowercase hyphenated form. Anything else is kept as a
/// trimmed legacy key, so a malformed identifier simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// `None` only for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match Uuid::parse_str(trimmed) {
            Ok(uuid) => Some(Self(uuid.to_string())),
            Err(_) => Some(Self(trimmed.to_string())),
        }
    }

    /// Identifier of a stored document.
    pub fn of(doc: &Document) -> Option<Self> {
        doc.get("id").and_then(|v| v.as_str()).and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
