use serde::Serialize;

use crate::models::{Section, TeamMember, Todo, TodoStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_todos: usize,
    pub todo_todos: usize,
    pub in_progress_todos: usize,
    pub completed_todos: usize,
    /// Whole percent, rounded half up.
    pub completion_rate: u32,
    pub active_sections: usize,
    pub team_size: usize,
    pub online_members: usize,
}

/// Always computed over the full collections, never the filtered view.
pub fn statistics(todos: &[Todo], sections: &[Section], members: &[TeamMember]) -> Statistics {
    let count = |status: TodoStatus| todos.iter().filter(|t| t.status == status).count();

    let total_todos = todos.len();
    let completed_todos = count(TodoStatus::Completed);
    let completion_rate = if total_todos > 0 {
        ((completed_todos * 200 + total_todos) / (total_todos * 2)) as u32
    } else {
        0
    };

    Statistics {
        total_todos,
        todo_todos: count(TodoStatus::Todo),
        in_progress_todos: count(TodoStatus::InProgress),
        completed_todos,
        completion_rate,
        active_sections: sections
            .iter()
            .filter(|s| todos.iter().any(|t| t.section_id == s.id))
            .count(),
        team_size: members.len(),
        online_members: members.iter().filter(|m| m.online).count(),
    }
}
