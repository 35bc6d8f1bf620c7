use serde::{Deserialize, Serialize};

use super::{Comment, Section, TeamMember, Todo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
}

/// The whole persisted document. Field names match the exported backup
/// format so older exports import unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub sections: Vec<Section>,
    pub todos: Vec<Todo>,
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub settings: Settings,
}

impl BoardState {
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn todo(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn member_by_email(&self, email: &str) -> Option<&TeamMember> {
        self.team_members.iter().find(|m| m.email == email)
    }

    pub fn comments_for<'a>(&'a self, todo_id: &'a str) -> impl Iterator<Item = &'a Comment> + 'a {
        self.comments.iter().filter(move |c| c.todo_id == todo_id)
    }
}
