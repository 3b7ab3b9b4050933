//! Project listing and write views

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use tracing::info;

use super::ui;
use crate::error::{ApiError, ApiResult};
use crate::services::{ProjectFields, SaveOutcome};
use crate::AppState;

/// GET /
///
/// Projects with their associated contacts. Any CRM failure fails the page.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let projects = state
        .resolver
        .list_projects()
        .await
        .map_err(|e| ApiError::crm("Error retrieving projects and contacts", e))?;

    Ok(Html(ui::index_page(&projects)))
}

/// GET /update-cobj/:id?
///
/// Blank form without an id, pre-filled from the CRM with one.
pub async fn edit_project_form(
    State(state): State<AppState>,
    id: Option<Path<String>>,
) -> ApiResult<Html<String>> {
    let id = id.map(|Path(id)| id);
    let context = state
        .projects
        .load_for_edit(id.as_deref())
        .await
        .map_err(|e| ApiError::crm("Error loading project", e))?;

    Ok(Html(ui::update_form_page(&context)))
}

/// POST /update-cobj/:id?
///
/// Update when the path carries an id, create otherwise.
pub async fn save_project(
    State(state): State<AppState>,
    id: Option<Path<String>>,
    Form(fields): Form<ProjectFields>,
) -> ApiResult<Redirect> {
    let id = id.map(|Path(id)| id);
    let outcome = state
        .projects
        .save(id.as_deref(), &fields)
        .await
        .map_err(|e| ApiError::crm("Error saving project", e))?;

    match outcome {
        SaveOutcome::Created(id) => info!(id = %id, "Project created"),
        SaveOutcome::Updated(id) => info!(id = %id, "Project updated"),
    }

    Ok(Redirect::to("/"))
}

/// POST /delete-cobj/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Redirect> {
    state
        .projects
        .delete(&id)
        .await
        .map_err(|e| ApiError::crm("Error deleting project", e))?;

    info!(id = %id, "Project archived");

    Ok(Redirect::to("/"))
}
