//! Board mutations as data. Every user action becomes a [`Command`] and is
//! applied by [`apply`], which takes the current state by value and hands
//! back the next one. Ids and the clock come from the caller.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::models::{
    BoardState, Comment, Section, StatusChange, TeamMember, Theme, Todo, TodoStatus,
    UpdateTodoRequest,
};
use crate::seed;

pub const DEFAULT_TODO_TITLE: &str = "New Todo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    AddSection {
        id: String,
        name: String,
        color: String,
    },
    UpdateSection {
        id: String,
        name: Option<String>,
        color: Option<String>,
    },
    DeleteSection {
        id: String,
    },
    AddTodo {
        id: String,
        section_id: String,
        title: Option<String>,
        description: Option<String>,
        status: Option<TodoStatus>,
        assigned_to: Option<String>,
    },
    UpdateTodo {
        id: String,
        /// Id for the status-change comment, used only when the patch
        /// changes status and names an author.
        comment_id: Option<String>,
        patch: UpdateTodoRequest,
    },
    DeleteTodo {
        id: String,
    },
    AddMember {
        id: String,
        name: String,
        email: String,
        online: bool,
    },
    SetMemberOnline {
        id: String,
        online: bool,
    },
    RemoveMember {
        id: String,
    },
    AddComment {
        id: String,
        todo_id: String,
        author: String,
        message: String,
        status_change: Option<StatusChange>,
    },
    SetTheme {
        theme: Theme,
    },
    Import {
        state: Box<BoardState>,
    },
    Reset,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddSection { .. } => "add_section",
            Command::UpdateSection { .. } => "update_section",
            Command::DeleteSection { .. } => "delete_section",
            Command::AddTodo { .. } => "add_todo",
            Command::UpdateTodo { .. } => "update_todo",
            Command::DeleteTodo { .. } => "delete_todo",
            Command::AddMember { .. } => "add_member",
            Command::SetMemberOnline { .. } => "set_member_online",
            Command::RemoveMember { .. } => "remove_member",
            Command::AddComment { .. } => "add_comment",
            Command::SetTheme { .. } => "set_theme",
            Command::Import { .. } => "import",
            Command::Reset => "reset",
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, BoardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn check_assignee(state: &BoardState, assignee: Option<&str>) -> Result<(), BoardError> {
    match assignee {
        Some(email) if state.member_by_email(email).is_none() => {
            Err(BoardError::UnknownMember(email.to_string()))
        }
        _ => Ok(()),
    }
}

fn first_duplicate<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    values.into_iter().find(|v| !seen.insert(*v))
}

/// Imported documents may carry orphaned todos, but ids and member emails
/// must be unique and every todo needs a title.
fn check_import(state: &BoardState) -> Result<(), BoardError> {
    let duplicates = [
        ("section id", first_duplicate(state.sections.iter().map(|s| s.id.as_str()))),
        ("todo id", first_duplicate(state.todos.iter().map(|t| t.id.as_str()))),
        ("member id", first_duplicate(state.team_members.iter().map(|m| m.id.as_str()))),
        ("member email", first_duplicate(state.team_members.iter().map(|m| m.email.as_str()))),
        ("comment id", first_duplicate(state.comments.iter().map(|c| c.id.as_str()))),
    ];
    if let Some((what, value)) = duplicates
        .into_iter()
        .find_map(|(what, dup)| dup.map(|v| (what, v)))
    {
        return Err(BoardError::InvalidImport(format!("duplicate {} {}", what, value)));
    }

    if let Some(todo) = state.todos.iter().find(|t| t.title.trim().is_empty()) {
        return Err(BoardError::InvalidImport(format!("todo {} has no title", todo.id)));
    }
    Ok(())
}

pub fn apply(
    mut state: BoardState,
    command: Command,
    now: DateTime<Utc>,
) -> Result<BoardState, BoardError> {
    match command {
        Command::AddSection { id, name, color } => {
            let name = required("section name", &name)?;
            state.sections.push(Section {
                id,
                name,
                color,
                is_default: false,
            });
        }

        Command::UpdateSection { id, name, color } => {
            let name = name.map(|n| required("section name", &n)).transpose()?;
            let section = state
                .sections
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| BoardError::not_found("section", &id))?;
            if let Some(name) = name {
                section.name = name;
            }
            if let Some(color) = color {
                section.color = color;
            }
        }

        Command::DeleteSection { id } => {
            let section = state
                .section(&id)
                .ok_or_else(|| BoardError::not_found("section", &id))?;
            if section.is_default {
                return Err(BoardError::DefaultSectionProtected(section.name.clone()));
            }
            let count = state.todos.iter().filter(|t| t.section_id == id).count();
            if count > 0 {
                return Err(BoardError::SectionNotEmpty {
                    name: section.name.clone(),
                    count,
                });
            }
            state.sections.retain(|s| s.id != id);
        }

        Command::AddTodo {
            id,
            section_id,
            title,
            description,
            status,
            assigned_to,
        } => {
            if state.section(&section_id).is_none() {
                return Err(BoardError::UnknownSection(section_id));
            }
            let title = match title {
                Some(t) => required("title", &t)?,
                None => DEFAULT_TODO_TITLE.to_string(),
            };
            let assigned_to = non_blank(assigned_to);
            check_assignee(&state, assigned_to.as_deref())?;

            state.todos.push(Todo {
                id,
                section_id,
                title,
                description: non_blank(description),
                status: status.unwrap_or_default(),
                assigned_to,
                created_at: now,
                modified_at: now,
            });
        }

        Command::UpdateTodo { id, comment_id, patch } => {
            let title = patch.title.as_deref().map(|t| required("title", t)).transpose()?;
            if let Some(section_id) = &patch.section_id {
                if state.section(section_id).is_none() {
                    return Err(BoardError::UnknownSection(section_id.clone()));
                }
            }
            let assigned_to = patch.assigned_to.map(non_blank);
            if let Some(assignee) = &assigned_to {
                check_assignee(&state, assignee.as_deref())?;
            }

            let todo = state
                .todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| BoardError::not_found("todo", &id))?;

            let before = todo.clone();
            if let Some(title) = title {
                todo.title = title;
            }
            if let Some(description) = patch.description {
                todo.description = non_blank(description);
            }
            if let Some(section_id) = patch.section_id {
                todo.section_id = section_id;
            }
            if let Some(status) = patch.status {
                todo.status = status;
            }
            if let Some(assigned_to) = assigned_to {
                todo.assigned_to = assigned_to;
            }
            if *todo == before {
                return Ok(state);
            }
            todo.modified_at = now;

            let previous_status = before.status;
            let new_status = todo.status;
            if new_status != previous_status {
                if let (Some(comment_id), Some(author)) = (comment_id, non_blank(patch.author)) {
                    state.comments.push(Comment {
                        id: comment_id,
                        todo_id: id,
                        author,
                        message: format!("Status changed to {}", new_status),
                        status_change: Some(StatusChange {
                            from: previous_status,
                            to: new_status,
                        }),
                        created_at: now,
                    });
                }
            }
        }

        Command::DeleteTodo { id } => {
            if state.todo(&id).is_none() {
                return Err(BoardError::not_found("todo", &id));
            }
            state.todos.retain(|t| t.id != id);
            state.comments.retain(|c| c.todo_id != id);
        }

        Command::AddMember {
            id,
            name,
            email,
            online,
        } => {
            let name = required("name", &name)?;
            let email = required("email", &email)?;
            if state.member_by_email(&email).is_some() {
                return Err(BoardError::DuplicateMember(email));
            }
            state.team_members.push(TeamMember {
                id,
                name,
                email,
                online,
            });
        }

        Command::SetMemberOnline { id, online } => {
            let member = state
                .team_members
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| BoardError::not_found("member", &id))?;
            member.online = online;
        }

        Command::RemoveMember { id } => {
            let pos = state
                .team_members
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| BoardError::not_found("member", &id))?;
            let member = state.team_members.remove(pos);

            for todo in state
                .todos
                .iter_mut()
                .filter(|t| t.assigned_to.as_deref() == Some(member.email.as_str()))
            {
                todo.assigned_to = None;
                todo.modified_at = now;
            }
        }

        Command::AddComment {
            id,
            todo_id,
            author,
            message,
            status_change,
        } => {
            if state.todo(&todo_id).is_none() {
                return Err(BoardError::not_found("todo", &todo_id));
            }
            let message = required("message", &message)?;
            state.comments.push(Comment {
                id,
                todo_id,
                author,
                message,
                status_change,
                created_at: now,
            });
        }

        Command::SetTheme { theme } => {
            state.settings.theme = theme;
        }

        Command::Import { state: imported } => {
            check_import(&imported)?;
            return Ok(*imported);
        }

        Command::Reset => {
            return Ok(seed::empty_board(state.settings));
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::Settings;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    fn board() -> BoardState {
        BoardState {
            sections: vec![
                Section {
                    id: "a".to_string(),
                    name: "Finance".to_string(),
                    color: "#4CAF50".to_string(),
                    is_default: true,
                },
                Section {
                    id: "b".to_string(),
                    name: "Side Projects".to_string(),
                    color: "#2196F3".to_string(),
                    is_default: false,
                },
            ],
            todos: vec![Todo {
                id: "t1".to_string(),
                section_id: "b".to_string(),
                title: "Draft plan".to_string(),
                description: None,
                status: TodoStatus::Todo,
                assigned_to: Some("john@example.com".to_string()),
                created_at: now() - Duration::days(3),
                modified_at: now() - Duration::days(3),
            }],
            team_members: vec![TeamMember {
                id: "m1".to_string(),
                name: "John Doe".to_string(),
                email: "john@example.com".to_string(),
                online: true,
            }],
            comments: Vec::new(),
            settings: Settings::default(),
        }
    }

    #[test]
    fn test_delete_section_rejected_until_empty() {
        let state = board();
        let err = apply(state.clone(), Command::DeleteSection { id: "b".to_string() }, now())
            .unwrap_err();
        assert_eq!(
            err,
            BoardError::SectionNotEmpty {
                name: "Side Projects".to_string(),
                count: 1
            }
        );

        let state = apply(state, Command::DeleteTodo { id: "t1".to_string() }, now()).unwrap();
        let state = apply(state, Command::DeleteSection { id: "b".to_string() }, now()).unwrap();
        assert!(state.section("b").is_none());
    }

    #[test]
    fn test_delete_section_accepted_after_todo_moves() {
        let patch = UpdateTodoRequest {
            section_id: Some("a".to_string()),
            ..Default::default()
        };
        let state = apply(
            board(),
            Command::UpdateTodo {
                id: "t1".to_string(),
                comment_id: None,
                patch,
            },
            now(),
        )
        .unwrap();
        let state = apply(state, Command::DeleteSection { id: "b".to_string() }, now()).unwrap();
        assert_eq!(state.sections.len(), 1);
        assert_eq!(state.todo("t1").unwrap().section_id, "a");
    }

    #[test]
    fn test_default_section_is_never_deleted() {
        let err = apply(board(), Command::DeleteSection { id: "a".to_string() }, now()).unwrap_err();
        assert_eq!(err, BoardError::DefaultSectionProtected("Finance".to_string()));
    }

    #[test]
    fn test_add_todo_defaults_and_validation() {
        let state = apply(
            board(),
            Command::AddTodo {
                id: "t2".to_string(),
                section_id: "a".to_string(),
                title: None,
                description: Some("".to_string()),
                status: None,
                assigned_to: Some("".to_string()),
            },
            now(),
        )
        .unwrap();
        let todo = state.todo("t2").unwrap();
        assert_eq!(todo.title, DEFAULT_TODO_TITLE);
        assert_eq!(todo.status, TodoStatus::Todo);
        assert_eq!(todo.description, None);
        assert_eq!(todo.assigned_to, None);
        assert_eq!(todo.created_at, now());
        assert_eq!(todo.modified_at, now());

        let err = apply(
            board(),
            Command::AddTodo {
                id: "t3".to_string(),
                section_id: "missing".to_string(),
                title: Some("x".to_string()),
                description: None,
                status: None,
                assigned_to: None,
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err, BoardError::UnknownSection("missing".to_string()));

        let err = apply(
            board(),
            Command::AddTodo {
                id: "t3".to_string(),
                section_id: "a".to_string(),
                title: Some("   ".to_string()),
                description: None,
                status: None,
                assigned_to: None,
            },
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
    }

    #[test]
    fn test_update_todo_refreshes_modified_and_records_status_change() {
        let patch = UpdateTodoRequest {
            status: Some(TodoStatus::Completed),
            author: Some("john@example.com".to_string()),
            ..Default::default()
        };
        let state = apply(
            board(),
            Command::UpdateTodo {
                id: "t1".to_string(),
                comment_id: Some("c1".to_string()),
                patch,
            },
            now(),
        )
        .unwrap();

        let todo = state.todo("t1").unwrap();
        assert_eq!(todo.status, TodoStatus::Completed);
        assert_eq!(todo.modified_at, now());
        assert!(todo.created_at < now());

        let comments: Vec<&Comment> = state.comments_for("t1").collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(
            comments[0].status_change,
            Some(StatusChange {
                from: TodoStatus::Todo,
                to: TodoStatus::Completed
            })
        );
    }

    #[test]
    fn test_update_todo_without_changes_keeps_modified() {
        let before = board().todo("t1").unwrap().modified_at;
        let patch = UpdateTodoRequest {
            title: Some("Draft plan".to_string()),
            status: Some(TodoStatus::Todo),
            author: Some("john@example.com".to_string()),
            ..Default::default()
        };
        for patch in [UpdateTodoRequest::default(), patch] {
            let state = apply(
                board(),
                Command::UpdateTodo {
                    id: "t1".to_string(),
                    comment_id: Some("c1".to_string()),
                    patch,
                },
                now(),
            )
            .unwrap();
            assert_eq!(state.todo("t1").unwrap().modified_at, before);
            assert!(state.comments.is_empty());
        }
    }

    #[test]
    fn test_import_rejects_duplicates_but_keeps_orphans() {
        let mut doc = board();
        doc.todos[0].section_id = "gone".to_string();
        let state = apply(board(), Command::Import { state: Box::new(doc.clone()) }, now()).unwrap();
        assert_eq!(state.todo("t1").unwrap().section_id, "gone");

        let mut dup_todo = doc.clone();
        dup_todo.todos.push(dup_todo.todos[0].clone());
        let err = apply(board(), Command::Import { state: Box::new(dup_todo) }, now())
            .unwrap_err();
        assert_eq!(err, BoardError::InvalidImport("duplicate todo id t1".to_string()));

        let mut dup_email = doc.clone();
        dup_email.team_members.push(TeamMember {
            id: "m2".to_string(),
            name: "Other John".to_string(),
            email: "john@example.com".to_string(),
            online: false,
        });
        let err = apply(board(), Command::Import { state: Box::new(dup_email) }, now())
            .unwrap_err();
        assert_eq!(
            err,
            BoardError::InvalidImport("duplicate member email john@example.com".to_string())
        );

        let mut dup_section = doc.clone();
        dup_section.sections.push(dup_section.sections[1].clone());
        let err = apply(board(), Command::Import { state: Box::new(dup_section) }, now())
            .unwrap_err();
        assert_eq!(err, BoardError::InvalidImport("duplicate section id b".to_string()));

        let mut untitled = doc;
        untitled.todos[0].title = " ".to_string();
        let err = apply(board(), Command::Import { state: Box::new(untitled) }, now())
            .unwrap_err();
        assert_eq!(err, BoardError::InvalidImport("todo t1 has no title".to_string()));
    }

    #[test]
    fn test_update_todo_clears_assignee_and_rejects_strangers() {
        let patch = UpdateTodoRequest {
            assigned_to: Some(None),
            ..Default::default()
        };
        let state = apply(
            board(),
            Command::UpdateTodo {
                id: "t1".to_string(),
                comment_id: None,
                patch,
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.todo("t1").unwrap().assigned_to, None);
        assert!(state.comments.is_empty());

        let patch = UpdateTodoRequest {
            assigned_to: Some(Some("nobody@example.com".to_string())),
            ..Default::default()
        };
        let err = apply(
            state,
            Command::UpdateTodo {
                id: "t1".to_string(),
                comment_id: None,
                patch,
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err, BoardError::UnknownMember("nobody@example.com".to_string()));
    }

    #[test]
    fn test_remove_member_unassigns_todos() {
        let state = apply(board(), Command::RemoveMember { id: "m1".to_string() }, now()).unwrap();
        assert!(state.team_members.is_empty());
        let todo = state.todo("t1").unwrap();
        assert_eq!(todo.assigned_to, None);
        assert_eq!(todo.modified_at, now());
        assert_eq!(state.todos.len(), 1);
    }

    #[test]
    fn test_duplicate_member_email_rejected() {
        let err = apply(
            board(),
            Command::AddMember {
                id: "m2".to_string(),
                name: "Johnny".to_string(),
                email: " john@example.com ".to_string(),
                online: false,
            },
            now(),
        )
        .unwrap_err();
        assert_eq!(err, BoardError::DuplicateMember("john@example.com".to_string()));
    }

    #[test]
    fn test_delete_todo_cascades_comments() {
        let state = apply(
            board(),
            Command::AddComment {
                id: "c1".to_string(),
                todo_id: "t1".to_string(),
                author: "john@example.com".to_string(),
                message: "on it".to_string(),
                status_change: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.comments.len(), 1);

        let state = apply(state, Command::DeleteTodo { id: "t1".to_string() }, now()).unwrap();
        assert!(state.comments.is_empty());
    }

    #[test]
    fn test_reset_keeps_defaults_and_theme() {
        let state = apply(board(), Command::SetTheme { theme: Theme::Dark }, now()).unwrap();
        let state = apply(state, Command::Reset, now()).unwrap();
        assert_eq!(state.sections.len(), 5);
        assert!(state.sections.iter().all(|s| s.is_default));
        assert!(state.todos.is_empty());
        assert!(state.team_members.is_empty());
        assert_eq!(state.settings.theme, Theme::Dark);
    }

    #[test]
    fn test_command_wire_format() {
        let cmd: Command = serde_json::from_str(
            r#"{"type":"addTodo","id":"t9","sectionId":"a","title":"Ship it"}"#,
        )
        .unwrap();
        assert_eq!(cmd.name(), "add_todo");
        match cmd {
            Command::AddTodo { section_id, title, .. } => {
                assert_eq!(section_id, "a");
                assert_eq!(title.as_deref(), Some("Ship it"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
