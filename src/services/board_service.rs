use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::commands::{self, Command};
use crate::error::AppError;
use crate::models::*;
use crate::projector::{self, Statistics, ViewFilter};
use crate::seed;
use crate::store::BoardStore;

/// Owns the current board snapshot and the store it is persisted to.
///
/// Readers clone the snapshot. Writers are serialized: each command is
/// applied to a copy, saved, and only then becomes the visible state.
pub struct BoardService {
    store: Arc<dyn BoardStore>,
    state: RwLock<BoardState>,
    write_lock: Mutex<()>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl BoardService {
    pub async fn open(store: Arc<dyn BoardStore>) -> Result<Self, AppError> {
        let state = match store.load().await? {
            Some(state) => {
                info!(
                    "loaded board from {} store: {} sections, {} todos, {} members",
                    store.kind(),
                    state.sections.len(),
                    state.todos.len(),
                    state.team_members.len()
                );
                state
            }
            None => {
                info!("{} store is empty, seeding default board", store.kind());
                let state = seed::sample_board();
                store.save(&state).await?;
                state
            }
        };

        Ok(Self {
            store,
            state: RwLock::new(state),
            write_lock: Mutex::new(()),
        })
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    pub async fn snapshot(&self) -> BoardState {
        self.state.read().await.clone()
    }

    pub async fn with_view<T>(&self, filter: &ViewFilter, f: impl FnOnce(projector::BoardView<'_>) -> T) -> T {
        let state = self.state.read().await;
        let view = projector::project(&state.todos, &state.sections, &state.team_members, filter);
        if view.has_orphans() {
            warn!(
                "{} todo(s) reference missing sections: {:?}",
                view.unfiled.len(),
                view.unfiled.iter().map(|t| t.id.as_str()).collect::<Vec<_>>()
            );
        }
        f(view)
    }

    pub async fn statistics(&self) -> Statistics {
        let state = self.state.read().await;
        projector::statistics(&state.todos, &state.sections, &state.team_members)
    }

    pub async fn dispatch(&self, command: Command) -> Result<BoardState, AppError> {
        let _guard = self.write_lock.lock().await;
        let name = command.name();

        let current = self.state.read().await.clone();
        let next = commands::apply(current, command, Utc::now()).inspect_err(|e| {
            debug!("command {} rejected: {}", name, e);
        })?;

        self.store.save(&next).await?;
        *self.state.write().await = next.clone();
        debug!("command {} applied", name);
        Ok(next)
    }

    pub async fn add_section(&self, req: NewSectionRequest) -> Result<Section, AppError> {
        let id = new_id();
        let state = self
            .dispatch(Command::AddSection {
                id: id.clone(),
                name: req.name,
                color: req.color,
            })
            .await?;
        found(state.section(&id).cloned(), "section", &id)
    }

    pub async fn update_section(&self, id: &str, req: UpdateSectionRequest) -> Result<Section, AppError> {
        let state = self
            .dispatch(Command::UpdateSection {
                id: id.to_string(),
                name: req.name,
                color: req.color,
            })
            .await?;
        found(state.section(id).cloned(), "section", id)
    }

    pub async fn delete_section(&self, id: &str) -> Result<(), AppError> {
        self.dispatch(Command::DeleteSection { id: id.to_string() }).await?;
        Ok(())
    }

    pub async fn add_todo(&self, req: NewTodoRequest) -> Result<Todo, AppError> {
        let id = new_id();
        let state = self
            .dispatch(Command::AddTodo {
                id: id.clone(),
                section_id: req.section_id,
                title: req.title,
                description: req.description,
                status: req.status,
                assigned_to: req.assigned_to,
            })
            .await?;
        found(state.todo(&id).cloned(), "todo", &id)
    }

    pub async fn update_todo(&self, id: &str, patch: UpdateTodoRequest) -> Result<Todo, AppError> {
        let state = self
            .dispatch(Command::UpdateTodo {
                id: id.to_string(),
                comment_id: Some(new_id()),
                patch,
            })
            .await?;
        found(state.todo(id).cloned(), "todo", id)
    }

    pub async fn delete_todo(&self, id: &str) -> Result<(), AppError> {
        self.dispatch(Command::DeleteTodo { id: id.to_string() }).await?;
        Ok(())
    }

    pub async fn add_member(&self, req: NewMemberRequest) -> Result<TeamMember, AppError> {
        let id = new_id();
        let state = self
            .dispatch(Command::AddMember {
                id: id.clone(),
                name: req.name,
                email: req.email,
                online: req.online,
            })
            .await?;
        found(
            state.team_members.iter().find(|m| m.id == id).cloned(),
            "member",
            &id,
        )
    }

    pub async fn set_member_online(&self, id: &str, online: bool) -> Result<TeamMember, AppError> {
        let state = self
            .dispatch(Command::SetMemberOnline {
                id: id.to_string(),
                online,
            })
            .await?;
        found(
            state.team_members.iter().find(|m| m.id == id).cloned(),
            "member",
            id,
        )
    }

    pub async fn remove_member(&self, id: &str) -> Result<(), AppError> {
        self.dispatch(Command::RemoveMember { id: id.to_string() }).await?;
        Ok(())
    }

    pub async fn add_comment(&self, todo_id: &str, req: NewCommentRequest) -> Result<Comment, AppError> {
        let id = new_id();
        let state = self
            .dispatch(Command::AddComment {
                id: id.clone(),
                todo_id: todo_id.to_string(),
                author: req.author,
                message: req.message,
                status_change: req.status_change,
            })
            .await?;
        found(state.comments.iter().find(|c| c.id == id).cloned(), "comment", &id)
    }

    pub async fn comments_for(&self, todo_id: &str) -> Result<Vec<Comment>, AppError> {
        let state = self.state.read().await;
        if state.todo(todo_id).is_none() {
            return Err(crate::error::BoardError::not_found("todo", todo_id).into());
        }
        Ok(state.comments_for(todo_id).cloned().collect())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Settings, AppError> {
        let state = self.dispatch(Command::SetTheme { theme }).await?;
        Ok(state.settings)
    }

    pub async fn import(&self, imported: BoardState) -> Result<BoardState, AppError> {
        info!(
            "importing board: {} sections, {} todos, {} members",
            imported.sections.len(),
            imported.todos.len(),
            imported.team_members.len()
        );
        self.dispatch(Command::Import {
            state: Box::new(imported),
        })
        .await
    }

    /// Replaces the board with the default sections in a single save.
    pub async fn reset(&self) -> Result<BoardState, AppError> {
        warn!("clearing all board data");
        self.dispatch(Command::Reset).await
    }
}

fn found<T>(entity: Option<T>, kind: &'static str, id: &str) -> Result<T, AppError> {
    entity.ok_or_else(|| crate::error::BoardError::not_found(kind, id).into())
}
