use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::TodoStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Created,
    Modified,
    Title,
}

/// Active filter controls. Empty values mean "no filter", so a query string
/// like `?status=&assignee=` is the unfiltered board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<TodoStatus>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub sort: SortKey,
}

impl ViewFilter {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(SortKey::Created),
            "modified" => Ok(SortKey::Modified),
            "title" => Ok(SortKey::Title),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn blank_as_default<'de, D>(deserializer: D) -> Result<SortKey, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none::<D, SortKey>(deserializer).map(Option::unwrap_or_default)
}

/// Collation close to a root-locale `localeCompare`: letters compare
/// case-insensitively first, then lowercase sorts ahead of uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if primary != Ordering::Equal {
        return primary;
    }

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            match (ca.is_lowercase(), cb.is_lowercase()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => return ca.cmp(&cb),
            }
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_cmp_ignores_case_first() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Banana", "apple"), Ordering::Greater);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("Review", "review"), Ordering::Greater);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_blank_query_values_mean_no_filter() {
        let filter: ViewFilter =
            serde_json::from_str(r#"{"search":"","status":"","assignee":"","sort":""}"#).unwrap();
        assert_eq!(filter, ViewFilter::default());

        let filter: ViewFilter =
            serde_json::from_str(r#"{"status":"in-progress","sort":"title"}"#).unwrap();
        assert_eq!(filter.status, Some(TodoStatus::InProgress));
        assert_eq!(filter.sort, SortKey::Title);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_str::<ViewFilter>(r#"{"status":"blocked"}"#);
        assert!(result.is_err());
    }
}
