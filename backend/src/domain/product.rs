//! Product aggregate and the drafts used to create or change it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ProductId, Tag, TagName, TagNameError, UserId};

/// Longest accepted product URL, in characters.
pub const MAX_URL_CHARS: usize = 2048;

/// A tracked product together with its tags.
///
/// `deleted_at` is `None` while the product is active and set while it sits
/// in the trash. `video_count` mirrors the sum of the product's video logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub user_id: UserId,
    pub url: String,
    pub image_url: Option<String>,
    pub notes: String,
    pub purchased: bool,
    pub purchased_at: Option<DateTime<Utc>>,
    pub video_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

impl Product {
    /// Whether the product is in the trash.
    #[must_use]
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Validation failures raised while building a [`ProductDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("url must be at most {max} characters")]
    UrlTooLong { max: usize },
    #[error("invalid tag: {0}")]
    Tag(#[from] TagNameError),
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    url: String,
    image_url: Option<String>,
    notes: String,
    tag_names: Vec<TagName>,
}

impl ProductDraft {
    /// Validate raw creation input.
    ///
    /// The URL is trimmed and must be non-empty. Blank image URLs collapse to
    /// `None`, notes default to the empty string and tag names go through
    /// [`TagName::parse_list`].
    ///
    /// # Examples
    /// ```
    /// use prodtrack::domain::ProductDraft;
    ///
    /// let draft = ProductDraft::new(" https://shop.example/p/1 ", Some(""), None, ["shoes"])
    ///     .expect("valid draft");
    /// assert_eq!(draft.url(), "https://shop.example/p/1");
    /// assert!(draft.image_url().is_none());
    /// ```
    pub fn new<I, S>(
        url: &str,
        image_url: Option<&str>,
        notes: Option<&str>,
        tag_names: I,
    ) -> Result<Self, ProductValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let url = url.trim();
        if url.is_empty() {
            return Err(ProductValidationError::EmptyUrl);
        }
        if url.chars().count() > MAX_URL_CHARS {
            return Err(ProductValidationError::UrlTooLong { max: MAX_URL_CHARS });
        }
        let image_url = image_url
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        Ok(Self {
            url: url.to_owned(),
            image_url,
            notes: notes.unwrap_or_default().to_owned(),
            tag_names: TagName::parse_list(tag_names)?,
        })
    }

    /// Trimmed product link.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Image link, `None` when blank.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Free-form notes, empty when omitted.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Validated, de-duplicated tag names to find or create.
    pub fn tag_names(&self) -> &[TagName] {
        &self.tag_names
    }
}

/// How the purchase timestamp changes when the purchased flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseTransition {
    /// Flag unchanged; keep the existing timestamp.
    Unchanged,
    /// Pending to purchased; stamp `purchased_at`.
    Purchased(DateTime<Utc>),
    /// Purchased to pending; clear `purchased_at`.
    Reverted,
}

impl PurchaseTransition {
    /// Work out the transition from the current flag to `requested`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use prodtrack::domain::PurchaseTransition;
    ///
    /// let now = Utc::now();
    /// assert_eq!(PurchaseTransition::between(false, true, now), PurchaseTransition::Purchased(now));
    /// assert_eq!(PurchaseTransition::between(true, true, now), PurchaseTransition::Unchanged);
    /// ```
    #[must_use]
    pub fn between(current: bool, requested: bool, now: DateTime<Utc>) -> Self {
        match (current, requested) {
            (false, true) => Self::Purchased(now),
            (true, false) => Self::Reverted,
            _ => Self::Unchanged,
        }
    }

    /// The `purchased_at` value after applying the transition.
    #[must_use]
    pub fn apply(self, existing: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        match self {
            Self::Unchanged => existing,
            Self::Purchased(at) => Some(at),
            Self::Reverted => None,
        }
    }
}
