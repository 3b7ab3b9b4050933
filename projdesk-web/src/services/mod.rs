//! Project and contact services
//!
//! Each service owns a handle to the CRM gateway plus the settings it needs.
//! Nothing is cached: every call goes to the CRM.

pub mod association_resolver;
pub mod contact_association;
pub mod project_mutation;

pub use association_resolver::{AssociationResolver, BatchPolicy, ContactSummary, ProjectView};
pub use contact_association::{
    CandidateContact, ContactAssociationService, ContactIds, ContactSelection,
};
pub use project_mutation::{EditContext, ProjectFields, ProjectMutationService, SaveOutcome};

use crate::crm::CrmObject;
use serde::Serialize;

/// Number of records fetched per listing
pub const PAGE_SIZE: usize = 10;

/// Properties read for every project
pub const PROJECT_PROPERTIES: [&str; 3] = ["name", "description", "status"];

/// CRM settings shared by the services, fixed for the process lifetime
#[derive(Debug, Clone)]
pub struct CrmSettings {
    /// Custom object type holding projects
    pub project_object_type: String,
    /// Label used for project → contact links
    pub association_type: String,
    pub batch_policy: BatchPolicy,
}

/// A project record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
}

impl From<&CrmObject> for Project {
    fn from(obj: &CrmObject) -> Self {
        Self {
            id: obj.id.clone(),
            name: obj.property("name").to_string(),
            description: obj.property("description").to_string(),
            status: obj.property("status").to_string(),
        }
    }
}
