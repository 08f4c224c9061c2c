//! Tags: global labels attached to products and targeted by category goals.

use serde::{Deserialize, Serialize};

use crate::domain::TagId;

/// Colour assigned to tags created implicitly by name.
pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// Longest accepted tag name, in characters.
pub const MAX_TAG_NAME_CHARS: usize = 64;

/// A persisted tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Database key.
    pub id: TagId,
    /// Unique display name.
    pub name: String,
    /// Hex display colour, e.g. `#3B82F6`.
    pub color: String,
}

/// Validation failures for [`TagName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagNameError {
    /// Blank after trimming.
    #[error("tag name must not be empty")]
    Empty,
    /// Longer than [`MAX_TAG_NAME_CHARS`].
    #[error("tag name must be at most {max} characters")]
    TooLong {
        /// Character limit.
        max: usize,
    },
}

/// A trimmed, non-empty tag name used for find-or-create lookups.
///
/// # Examples
/// ```
/// use prodtrack::domain::TagName;
///
/// let name = TagName::new("  shoes ").expect("valid name");
/// assert_eq!(name.as_str(), "shoes");
/// assert!(TagName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagName(String);

impl TagName {
    /// Trim and validate a raw name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TagNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TagNameError::Empty);
        }
        if trimmed.chars().count() > MAX_TAG_NAME_CHARS {
            return Err(TagNameError::TooLong {
                max: MAX_TAG_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse a list of names, dropping blanks and duplicates while keeping
    /// first-seen order.
    ///
    /// # Errors
    /// Returns the first [`TagNameError::TooLong`] encountered.
    pub fn parse_list<I, S>(raw: I) -> Result<Vec<Self>, TagNameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<Self> = Vec::new();
        for value in raw {
            match Self::new(value) {
                Ok(name) if !names.contains(&name) => names.push(name),
                Ok(_) | Err(TagNameError::Empty) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(names)
    }

    /// Borrow the validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
