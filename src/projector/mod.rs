//! Derived board view: filtering, sorting, grouping by section and the
//! aggregate counts shown in the statistics panel.
//!
//! Everything here is a pure function of borrowed input. Nothing is cloned
//! into the view; sections and todos are referenced from the caller's
//! snapshot.

pub mod filter;
pub mod stats;

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Section, TeamMember, Todo};

pub use filter::{SortKey, ViewFilter, locale_cmp};
pub use stats::{Statistics, statistics};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView<'a> {
    pub section: &'a Section,
    pub todo_count: usize,
    pub todos: Vec<&'a Todo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView<'a> {
    pub sections: Vec<SectionView<'a>>,
    /// Matching todos whose section no longer exists.
    pub unfiled: Vec<&'a Todo>,
    pub matched: usize,
    pub stats: Statistics,
}

impl BoardView<'_> {
    pub fn has_orphans(&self) -> bool {
        !self.unfiled.is_empty()
    }
}

/// Applies the search, status and assignee filters and sorts the result.
pub fn filtered_todos<'a>(todos: &'a [Todo], filter: &ViewFilter) -> Vec<&'a Todo> {
    let needle = filter.search.to_lowercase();

    let mut filtered: Vec<&Todo> = todos
        .iter()
        .filter(|t| needle.is_empty() || t.matches_text(&needle))
        .filter(|t| filter.status.is_none_or(|s| t.status == s))
        .filter(|t| {
            filter
                .assignee
                .as_deref()
                .is_none_or(|a| t.assigned_to.as_deref() == Some(a))
        })
        .collect();

    // sort_by is stable, so equal timestamps keep input order
    match filter.sort {
        SortKey::Created => filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Modified => filtered.sort_by(|a, b| b.modified_at.cmp(&a.modified_at)),
        SortKey::Title => filtered.sort_by(|a, b| locale_cmp(&a.title, &b.title)),
    }

    filtered
}

pub fn project<'a>(
    todos: &'a [Todo],
    sections: &'a [Section],
    members: &[TeamMember],
    filter: &ViewFilter,
) -> BoardView<'a> {
    let filtered = filtered_todos(todos, filter);
    let known: HashSet<&str> = sections.iter().map(|s| s.id.as_str()).collect();

    let section_views = sections
        .iter()
        .filter_map(|section| {
            let todos: Vec<&Todo> = filtered
                .iter()
                .copied()
                .filter(|t| t.section_id == section.id)
                .collect();
            if todos.is_empty() && !section.is_default {
                return None;
            }
            Some(SectionView {
                section,
                todo_count: todos.len(),
                todos,
            })
        })
        .collect();

    let unfiled = filtered
        .iter()
        .copied()
        .filter(|t| !known.contains(t.section_id.as_str()))
        .collect();

    BoardView {
        sections: section_views,
        unfiled,
        matched: filtered.len(),
        stats: statistics(todos, sections, members),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::models::TodoStatus;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn section(id: &str, is_default: bool) -> Section {
        Section {
            id: id.to_string(),
            name: id.to_uppercase(),
            color: "#000000".to_string(),
            is_default,
        }
    }

    fn todo(id: &str, section_id: &str, title: &str, status: TodoStatus) -> Todo {
        Todo {
            id: id.to_string(),
            section_id: section_id.to_string(),
            title: title.to_string(),
            description: None,
            status,
            assigned_to: None,
            created_at: at(1, 0),
            modified_at: at(1, 0),
        }
    }

    fn member(email: &str, online: bool) -> TeamMember {
        TeamMember {
            id: email.to_string(),
            name: email.to_string(),
            email: email.to_string(),
            online,
        }
    }

    fn ids(todos: &[&Todo]) -> Vec<String> {
        todos.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_search_matches_title_or_description_case_insensitively() {
        let mut budget = todo("t1", "a", "Review Q4 Budget", TodoStatus::Todo);
        budget.description = Some("Analyze expenses".to_string());
        let mut server = todo("t2", "a", "Server Maintenance", TodoStatus::Todo);
        server.description = Some("monthly BUDGET check".to_string());
        let other = todo("t3", "a", "Team Review", TodoStatus::Todo);
        let todos = vec![budget, server, other];

        let hits = filtered_todos(&todos, &ViewFilter::default().search("budget"));
        assert_eq!(ids(&hits), vec!["t1", "t2"]);

        let hits = filtered_todos(&todos[1..2], &ViewFilter::default().search("maint"));
        assert_eq!(hits.len(), 1);

        let hits = filtered_todos(&todos[1..2], &ViewFilter::default().search("review"));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_search_text_is_not_trimmed() {
        let todos = vec![
            todo("t1", "a", "Review Q4 Budget", TodoStatus::Todo),
            todo("t2", "a", "Budget review", TodoStatus::Todo),
        ];

        let hits = filtered_todos(&todos, &ViewFilter::default().search("budget "));
        assert_eq!(ids(&hits), vec!["t2"]);

        let hits = filtered_todos(&todos, &ViewFilter::default().search("  "));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_status_and_assignee_filters_are_exact() {
        let mut a = todo("t1", "a", "A", TodoStatus::Todo);
        a.assigned_to = Some("john@example.com".to_string());
        let mut b = todo("t2", "a", "B", TodoStatus::Completed);
        b.assigned_to = Some("john@example.com".to_string());
        let c = todo("t3", "a", "C", TodoStatus::Completed);
        let todos = vec![a, b, c];

        let hits = filtered_todos(&todos, &ViewFilter::default().status(TodoStatus::Completed));
        assert_eq!(ids(&hits), vec!["t2", "t3"]);

        let hits = filtered_todos(
            &todos,
            &ViewFilter::default()
                .status(TodoStatus::Completed)
                .assignee("john@example.com"),
        );
        assert_eq!(ids(&hits), vec!["t2"]);

        let hits = filtered_todos(&todos, &ViewFilter::default().assignee("john"));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_timestamp_sorts_are_descending_and_stable() {
        let mut first = todo("t1", "a", "first", TodoStatus::Todo);
        let mut second = todo("t2", "a", "second", TodoStatus::Todo);
        let mut third = todo("t3", "a", "third", TodoStatus::Todo);
        first.created_at = at(2, 0);
        second.created_at = at(3, 0);
        third.created_at = at(2, 0);
        first.modified_at = at(5, 0);
        second.modified_at = at(4, 0);
        third.modified_at = at(6, 0);
        let todos = vec![first, second, third];

        let by_created = filtered_todos(&todos, &ViewFilter::default());
        assert_eq!(ids(&by_created), vec!["t2", "t1", "t3"]);

        let by_modified = filtered_todos(&todos, &ViewFilter::default().sort(SortKey::Modified));
        assert_eq!(ids(&by_modified), vec!["t3", "t1", "t2"]);
    }

    #[test]
    fn test_title_sort_is_case_insensitive_ascending() {
        let todos = vec![
            todo("t1", "a", "server maintenance", TodoStatus::Todo),
            todo("t2", "a", "Budget", TodoStatus::Todo),
            todo("t3", "a", "audit", TodoStatus::Todo),
        ];
        let sorted = filtered_todos(&todos, &ViewFilter::default().sort(SortKey::Title));
        assert_eq!(ids(&sorted), vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn test_default_sections_always_render_and_empty_custom_sections_never_do() {
        let sections = vec![section("a", true), section("b", false), section("c", false)];
        let todos = vec![todo("t1", "c", "Only in c", TodoStatus::Todo)];

        let view = project(&todos, &sections, &[], &ViewFilter::default());
        let shown: Vec<&str> = view.sections.iter().map(|s| s.section.id.as_str()).collect();
        assert_eq!(shown, vec!["a", "c"]);
        assert_eq!(view.sections[0].todo_count, 0);
        assert_eq!(view.sections[1].todo_count, 1);

        let view = project(&todos, &sections, &[], &ViewFilter::default().search("nothing"));
        let shown: Vec<&str> = view.sections.iter().map(|s| s.section.id.as_str()).collect();
        assert_eq!(shown, vec!["a"]);
    }

    #[test]
    fn test_orphans_are_reported_not_dropped() {
        let sections = vec![section("a", true)];
        let todos = vec![
            todo("t1", "a", "filed", TodoStatus::Todo),
            todo("t2", "gone", "orphan", TodoStatus::Todo),
        ];

        let view = project(&todos, &sections, &[], &ViewFilter::default());
        assert!(view.has_orphans());
        assert_eq!(ids(&view.unfiled), vec!["t2"]);

        let rendered: usize = view.sections.iter().map(|s| s.todo_count).sum();
        assert_eq!(rendered + view.unfiled.len(), view.matched);
    }

    #[test]
    fn test_counts_add_up_to_matches_for_every_filter() {
        let sections = vec![section("a", true), section("b", false)];
        let mut todos = vec![
            todo("t1", "a", "Review Q4 Budget", TodoStatus::Todo),
            todo("t2", "b", "Server Maintenance", TodoStatus::InProgress),
            todo("t3", "b", "Budget sync", TodoStatus::Completed),
            todo("t4", "x", "budget orphan", TodoStatus::Completed),
        ];
        todos[0].assigned_to = Some("john@example.com".to_string());

        let filters = vec![
            ViewFilter::default(),
            ViewFilter::default().search("budget"),
            ViewFilter::default().status(TodoStatus::Completed),
            ViewFilter::default().assignee("john@example.com"),
            ViewFilter::default().search("budget").sort(SortKey::Title),
        ];

        for filter in filters {
            let view = project(&todos, &sections, &[], &filter);
            let rendered: usize = view.sections.iter().map(|s| s.todos.len()).sum();
            assert_eq!(rendered + view.unfiled.len(), view.matched, "filter {:?}", filter);
            assert_eq!(view.matched, filtered_todos(&todos, &filter).len());
        }
    }

    #[test]
    fn test_projection_is_idempotent_and_leaves_input_untouched() {
        let sections = vec![section("a", true)];
        let todos = vec![
            todo("t1", "a", "beta", TodoStatus::Todo),
            todo("t2", "a", "alpha", TodoStatus::Todo),
        ];
        let before = todos.clone();
        let filter = ViewFilter::default().sort(SortKey::Title);

        let first = ids(&project(&todos, &sections, &[], &filter).sections[0].todos);
        let second = ids(&project(&todos, &sections, &[], &filter).sections[0].todos);
        assert_eq!(first, second);
        assert_eq!(first, vec!["t2", "t1"]);
        assert_eq!(todos, before);
    }

    #[test]
    fn test_statistics_ignore_active_filters() {
        let sections = vec![section("a", true), section("b", false), section("c", false)];
        let todos = vec![
            todo("t1", "a", "one", TodoStatus::Todo),
            todo("t2", "b", "two", TodoStatus::InProgress),
            todo("t3", "b", "three", TodoStatus::Completed),
        ];
        let members = vec![member("john@example.com", true), member("sarah@example.com", false)];

        let view = project(
            &todos,
            &sections,
            &members,
            &ViewFilter::default().status(TodoStatus::Completed),
        );
        assert_eq!(view.matched, 1);
        assert_eq!(view.stats.total_todos, 3);
        assert_eq!(view.stats.todo_todos, 1);
        assert_eq!(view.stats.in_progress_todos, 1);
        assert_eq!(view.stats.completed_todos, 1);
        assert_eq!(view.stats.completion_rate, 33);
        assert_eq!(view.stats.active_sections, 2);
        assert_eq!(view.stats.team_size, 2);
        assert_eq!(view.stats.online_members, 1);
    }

    #[test]
    fn test_completion_rate_rounds_half_up() {
        let todos = vec![
            todo("t1", "a", "one", TodoStatus::Completed),
            todo("t2", "a", "two", TodoStatus::Completed),
            todo("t3", "a", "three", TodoStatus::Todo),
        ];
        assert_eq!(statistics(&todos, &[], &[]).completion_rate, 67);

        let mut eight: Vec<Todo> = (0..8)
            .map(|i| todo(&format!("t{}", i), "a", "x", TodoStatus::Todo))
            .collect();
        eight[0].status = TodoStatus::Completed;
        assert_eq!(statistics(&eight, &[], &[]).completion_rate, 13);
    }

    #[test]
    fn test_empty_board_has_zero_statistics() {
        let view = project(&[], &[], &[], &ViewFilter::default());
        assert!(view.sections.is_empty());
        assert!(view.unfiled.is_empty());
        assert_eq!(view.stats, Statistics::default());
    }
}
