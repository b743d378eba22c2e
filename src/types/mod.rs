//! Tool argument and result types
//!
//! GitLab responses are deserialized into loose structs (every field optional
//! or defaulted) and reshaped into the result types returned by the tools.

use serde::{Deserialize, Deserializer};

pub mod args;
pub mod inspect;
pub mod project;
pub mod release;
pub mod repository;
pub mod search;
pub mod wiki;

pub use args::*;
pub use inspect::*;
pub use project::*;
pub use release::*;
pub use repository::*;
pub use search::*;
pub use wiki::*;

/// Deserialize `null` as `T::default()`. GitLab sends `null` for many
/// collection and counter fields instead of omitting them.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Placeholder reported when a tool ran against the project's default branch
/// without resolving its name.
pub const DEFAULT_BRANCH_LABEL: &str = "(default branch)";
