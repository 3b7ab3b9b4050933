//! projdesk-web library interface
//!
//! Exposes the router, state and services for the binary and for integration
//! testing.

pub mod api;
pub mod config;
pub mod crm;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::crm::CrmGateway;
use crate::services::{
    AssociationResolver, ContactAssociationService, CrmSettings, ProjectMutationService,
};

/// Application state shared across handlers
///
/// Holds no mutable state; the CRM is the only source of truth.
#[derive(Clone)]
pub struct AppState {
    /// Project listing with resolved contacts
    pub resolver: Arc<AssociationResolver>,
    /// Project create / update / archive
    pub projects: Arc<ProjectMutationService>,
    /// Candidate contacts and project → contact links
    pub contacts: Arc<ContactAssociationService>,
}

impl AppState {
    /// Wire every service to the same gateway and settings
    pub fn new(gateway: Arc<dyn CrmGateway>, settings: CrmSettings) -> Self {
        let settings = Arc::new(settings);
        Self {
            resolver: Arc::new(AssociationResolver::new(gateway.clone(), settings.clone())),
            projects: Arc::new(ProjectMutationService::new(gateway.clone(), settings.clone())),
            contacts: Arc::new(ContactAssociationService::new(gateway, settings)),
        }
    }
}

/// Build application router
///
/// Static files under `static_dir` are served at `/public`.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::list_projects))
        .route(
            "/update-cobj",
            get(api::edit_project_form).post(api::save_project),
        )
        .route(
            "/update-cobj/",
            get(api::edit_project_form).post(api::save_project),
        )
        .route(
            "/update-cobj/:id",
            get(api::edit_project_form).post(api::save_project),
        )
        .route("/delete-cobj/:id", post(api::delete_project))
        .route(
            "/add-contact/:project_id",
            get(api::add_contact_form).post(api::add_contacts),
        )
        .merge(api::health_routes())
        .nest_service("/public", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
