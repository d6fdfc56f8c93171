use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use uuid::Uuid;

static ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates an identifier unique for the life of the process, e.g. `card-3f9a1c2e-1`.
///
/// The random fragment keeps ids unlikely to clash with ids minted by a
/// previous session; the counter guarantees uniqueness within this one.
pub fn create_id(prefix: &str) -> String {
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, &random[..8], counter)
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

string_id!(
    /// Identifier of a card, unique across the whole board
    CardId
);

string_id!(
    /// Identifier of a column; fixed once the board is created
    ColumnId
);

impl CardId {
    const PREFIX: &'static str = "card";

    /// Mints a fresh card id through [`create_id`]
    pub fn generate() -> Self {
        Self(create_id(Self::PREFIX))
    }
}
