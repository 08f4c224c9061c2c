//! Integer surrogate keys for the persisted aggregates.
//!
//! Each key is a distinct newtype so a `ProductId` cannot be passed where a
//! `GoalId` is expected. They serialise as bare integers.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database key.
            #[must_use]
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            /// Raw database key.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Account that owns products and goals.
    UserId
);
define_id!(
    /// Tracked product.
    ProductId
);
define_id!(
    /// Global tag shared across users.
    TagId
);
define_id!(
    /// Monthly goal.
    GoalId
);
define_id!(
    /// Per-day video log entry.
    VideoLogId
);
define_id!(
    /// Per-tag target inside a goal.
    CategoryGoalId
);
