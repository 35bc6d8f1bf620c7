use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};

use super::BoardStore;
use crate::error::StoreError;
use crate::models::{
    BoardState, Comment, Section, Settings, StatusChange, TeamMember, Theme, Todo, TodoStatus,
};

#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

#[derive(Debug, FromRow)]
struct TodoRow {
    id: String,
    section_id: String,
    title: String,
    description: Option<String>,
    status: String,
    assigned_to: Option<String>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: String,
    todo_id: String,
    author: String,
    message: String,
    status_from: Option<String>,
    status_to: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_status(raw: &str) -> Result<TodoStatus, StoreError> {
    raw.parse()
        .map_err(|e: crate::models::todo::ParseStatusError| StoreError::Corrupt(e.to_string()))
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(Todo {
            status: parse_status(&row.status)?,
            id: row.id,
            section_id: row.section_id,
            title: row.title,
            description: row.description,
            assigned_to: row.assigned_to,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let status_change = match (row.status_from.as_deref(), row.status_to.as_deref()) {
            (Some(from), Some(to)) => Some(StatusChange {
                from: parse_status(from)?,
                to: parse_status(to)?,
            }),
            _ => None,
        };
        Ok(Comment {
            id: row.id,
            todo_id: row.todo_id,
            author: row.author,
            message: row.message,
            status_change,
            created_at: row.created_at,
        })
    }
}

impl SqliteStore {
    /// Opens the pool and runs the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        // in-memory databases exist per connection
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&db).await?;

        Ok(Self { db })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }

    async fn fetch_settings(&self) -> Result<Option<Settings>, StoreError> {
        let theme: Option<String> = sqlx::query_scalar("SELECT theme FROM settings WHERE id = 1")
            .fetch_optional(&self.db)
            .await?;

        Ok(theme.map(|t| Settings {
            theme: if t == "dark" { Theme::Dark } else { Theme::Light },
        }))
    }

    async fn fetch_sections(&self) -> Result<Vec<Section>, StoreError> {
        let rows: Vec<(String, String, String, bool)> = sqlx::query_as(
            "SELECT id, name, color, is_default FROM sections ORDER BY position",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, color, is_default)| Section {
                id,
                name,
                color,
                is_default,
            })
            .collect())
    }

    async fn fetch_todos(&self) -> Result<Vec<Todo>, StoreError> {
        sqlx::query_as::<_, TodoRow>(
            "SELECT id, section_id, title, description, status, assigned_to, created_at, modified_at FROM todos ORDER BY position",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(Todo::try_from)
        .collect()
    }

    async fn fetch_members(&self) -> Result<Vec<TeamMember>, StoreError> {
        let rows: Vec<(String, String, String, bool)> = sqlx::query_as(
            "SELECT id, name, email, online FROM team_members ORDER BY position",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, online)| TeamMember {
                id,
                name,
                email,
                online,
            })
            .collect())
    }

    async fn fetch_comments(&self) -> Result<Vec<Comment>, StoreError> {
        sqlx::query_as::<_, CommentRow>(
            "SELECT id, todo_id, author, message, status_from, status_to, created_at FROM comments ORDER BY position",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(Comment::try_from)
        .collect()
    }
}

#[async_trait]
impl BoardStore for SqliteStore {
    async fn load(&self) -> Result<Option<BoardState>, StoreError> {
        let Some(settings) = self.fetch_settings().await? else {
            return Ok(None);
        };

        Ok(Some(BoardState {
            sections: self.fetch_sections().await?,
            todos: self.fetch_todos().await?,
            team_members: self.fetch_members().await?,
            comments: self.fetch_comments().await?,
            settings,
        }))
    }

    async fn save(&self, state: &BoardState) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        for table in ["comments", "todos", "team_members", "sections"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }

        for (position, section) in state.sections.iter().enumerate() {
            sqlx::query(
                "INSERT INTO sections (id, position, name, color, is_default) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&section.id)
            .bind(position as i64)
            .bind(&section.name)
            .bind(&section.color)
            .bind(section.is_default)
            .execute(&mut *tx)
            .await?;
        }

        for (position, todo) in state.todos.iter().enumerate() {
            sqlx::query(
                "INSERT INTO todos (id, position, section_id, title, description, status, assigned_to, created_at, modified_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&todo.id)
            .bind(position as i64)
            .bind(&todo.section_id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.status.as_str())
            .bind(&todo.assigned_to)
            .bind(todo.created_at)
            .bind(todo.modified_at)
            .execute(&mut *tx)
            .await?;
        }

        for (position, member) in state.team_members.iter().enumerate() {
            sqlx::query(
                "INSERT INTO team_members (id, position, name, email, online) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&member.id)
            .bind(position as i64)
            .bind(&member.name)
            .bind(&member.email)
            .bind(member.online)
            .execute(&mut *tx)
            .await?;
        }

        for (position, comment) in state.comments.iter().enumerate() {
            sqlx::query(
                "INSERT INTO comments (id, position, todo_id, author, message, status_from, status_to, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&comment.id)
            .bind(position as i64)
            .bind(&comment.todo_id)
            .bind(&comment.author)
            .bind(&comment.message)
            .bind(comment.status_change.map(|c| c.from.as_str()))
            .bind(comment.status_change.map(|c| c.to.as_str()))
            .bind(comment.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO settings (id, theme) VALUES (1, ?) ON CONFLICT(id) DO UPDATE SET theme = excluded.theme",
        )
        .bind(state.settings.theme.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;
        for table in ["comments", "todos", "team_members", "sections", "settings"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}
