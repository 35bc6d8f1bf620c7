pub mod board;
pub mod comment;
pub mod member;
pub mod section;
pub mod todo;

pub use board::{BoardState, Settings, Theme};
pub use comment::{Comment, NewCommentRequest, StatusChange};
pub use member::{NewMemberRequest, TeamMember, UpdateMemberRequest};
pub use section::{NewSectionRequest, Section, UpdateSectionRequest};
pub use todo::{NewTodoRequest, Todo, TodoStatus, UpdateTodoRequest};

use serde::{Deserialize, Deserializer};

/// Older documents store "no value" as an empty string.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

pub(crate) fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_as_none(deserializer).map(Some)
}
