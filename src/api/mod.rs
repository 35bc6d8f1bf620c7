use axum::Json;
use axum::extract::{Path, Query};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, StoreError};
use crate::export;
use crate::models::*;
use crate::projector::{Statistics, ViewFilter};
use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/board", get(board_view))
        .route("/stats", get(stats))
        .route("/sections", get(list_sections).post(create_section))
        .route("/sections/{id}", patch(update_section).delete(delete_section))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .route("/todos/{id}/comments", get(list_comments).post(create_comment))
        .route("/members", get(list_members).post(create_member))
        .route("/members/{id}", patch(update_member).delete(remove_member))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/export", get(export_board))
        .route("/import", post(import_board))
        .route("/reset", post(reset_board))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: state.board.store_kind(),
    })
}

async fn board_view(
    State(state): State<AppState>,
    Query(filter): Query<ViewFilter>,
) -> Result<Json<Value>, AppError> {
    let view = state
        .board
        .with_view(&filter, |view| serde_json::to_value(&view))
        .await
        .map_err(StoreError::from)?;
    Ok(Json(view))
}

async fn stats(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.board.statistics().await)
}

async fn list_sections(State(state): State<AppState>) -> Json<Vec<Section>> {
    Json(state.board.snapshot().await.sections)
}

async fn create_section(
    State(state): State<AppState>,
    Json(req): Json<NewSectionRequest>,
) -> Result<(StatusCode, Json<Section>), AppError> {
    let section = state.board.add_section(req).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSectionRequest>,
) -> Result<Json<Section>, AppError> {
    let section = state.board.update_section(&id, req).await?;
    Ok(Json(section))
}

async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.board.delete_section(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.board.snapshot().await.todos)
}

async fn create_todo(
    State(state): State<AppState>,
    Json(req): Json<NewTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = state.board.add_todo(req).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    let todo = state.board.update_todo(&id, req).await?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.board.delete_todo(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = state.board.comments_for(&id).await?;
    Ok(Json(comments))
}

async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state.board.add_comment(&id, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_members(State(state): State<AppState>) -> Json<Vec<TeamMember>> {
    Json(state.board.snapshot().await.team_members)
}

async fn create_member(
    State(state): State<AppState>,
    Json(req): Json<NewMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>), AppError> {
    let member = state.board.add_member(req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<TeamMember>, AppError> {
    let member = state.board.set_member_online(&id, req.online).await?;
    Ok(Json(member))
}

async fn remove_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.board.remove_member(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.board.snapshot().await.settings)
}

async fn put_settings(
    State(state): State<AppState>,
    Json(req): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    let settings = state.board.set_theme(req.theme).await?;
    Ok(Json(settings))
}

async fn export_board(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = export::export_json(&state.board.snapshot().await)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::backup_file_name(Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

async fn import_board(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<BoardState>, AppError> {
    let imported = export::parse_import(&body)?;
    let board = state.board.import(imported).await?;
    Ok(Json(board))
}

async fn reset_board(State(state): State<AppState>) -> Result<Json<BoardState>, AppError> {
    let board = state.board.reset().await?;
    Ok(Json(board))
}
