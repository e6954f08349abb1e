//! Handle identifiers: a handle is either a plain slot key or a synthetic
//! sub-handle `"<key>__<index>"` disambiguating the ordinal position an edge
//! occupies on a multi-input slot.

use crate::slot::SlotKey;

/// Separator between a slot key and its ordinal sub-handle index.
pub const SUB_HANDLE_SEPARATOR: &str = "__";

/// A parsed handle identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    pub key: SlotKey,
    pub index: Option<usize>,
}

impl Handle {
    pub fn plain(key: impl Into<SlotKey>) -> Self {
        Self {
            key: key.into(),
            index: None,
        }
    }

    pub fn indexed(key: impl Into<SlotKey>, index: usize) -> Self {
        Self {
            key: key.into(),
            index: Some(index),
        }
    }

    /// Parses a raw handle string. Anything that is not a well-formed
    /// sub-handle is treated as a plain key, including keys that happen to
    /// contain the separator with a non-numeric tail.
    pub fn parse(raw: &str) -> Self {
        if let Some((key, suffix)) = raw.rsplit_once(SUB_HANDLE_SEPARATOR)
            && !key.is_empty()
            && let Ok(index) = suffix.parse::<usize>()
        {
            return Self::indexed(key, index);
        }
        Self::plain(raw)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}{}{}", self.key, SUB_HANDLE_SEPARATOR, index),
            None => write!(f, "{}", self.key),
        }
    }
}

/// Formats the sub-handle for position `index` of a multi-input slot.
pub fn indexed_handle(key: &str, index: usize) -> String {
    format!("{}{}{}", key, SUB_HANDLE_SEPARATOR, index)
}
