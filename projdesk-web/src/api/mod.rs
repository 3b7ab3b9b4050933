//! HTTP handlers for projdesk-web
//!
//! Read views render HTML; write views redirect to the listing on success.

pub mod contacts;
pub mod health;
pub mod projects;
pub mod ui;

pub use contacts::{add_contact_form, add_contacts, SelectedContacts};
pub use health::health_routes;
pub use projects::{delete_project, edit_project_form, list_projects, save_project};
