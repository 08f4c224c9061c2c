//! Driven port resolving tag names to stable tag rows.

use async_trait::async_trait;

use crate::domain::{DEFAULT_TAG_COLOR, Tag, TagId, TagName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by tag registry adapters.
    pub enum TagRegistryError {
        Connection { message: String } =>
            "tag registry connection failed: {message}",
        Query { message: String } =>
            "tag registry query failed: {message}",
    }
}

/// Find-or-create access to the global tag table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRegistry: Send + Sync {
    /// Return the tag with this name, creating it with the default colour
    /// when it does not exist yet. Concurrent callers converge on one row.
    async fn find_or_create(&self, name: &TagName) -> Result<Tag, TagRegistryError>;
}

/// Fixture registry that fabricates tags without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTagRegistry;

#[async_trait]
impl TagRegistry for FixtureTagRegistry {
    async fn find_or_create(&self, name: &TagName) -> Result<Tag, TagRegistryError> {
        Ok(Tag {
            id: TagId::new(0),
            name: name.as_str().to_owned(),
            color: DEFAULT_TAG_COLOR.to_owned(),
        })
    }
}
