//! Linking contacts to a project

use super::{CrmSettings, PAGE_SIZE};
use crate::crm::{AssociationInput, CrmError, CrmGateway, CrmObject, CONTACTS};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Contact properties shown in the selection form
pub const CANDIDATE_PROPERTIES: [&str; 3] = ["firstname", "lastname", "email"];

/// Contact offered in the selection form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateContact {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: Option<String>,
}

impl From<&CrmObject> for CandidateContact {
    fn from(obj: &CrmObject) -> Self {
        Self {
            id: obj.id.clone(),
            firstname: obj.property("firstname").to_string(),
            lastname: obj.property("lastname").to_string(),
            email: obj.optional_property("email").map(str::to_string),
        }
    }
}

/// Submitted contact selection: a single id or a list of ids
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ContactSelection {
    One(String),
    Many(Vec<String>),
}

impl ContactSelection {
    /// Normalize to a list of ids
    pub fn into_ids(self) -> Vec<String> {
        match self {
            ContactSelection::One(id) => vec![id],
            ContactSelection::Many(ids) => ids,
        }
    }
}

/// Non-empty list of contact ids, blanks removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactIds(Vec<String>);

impl ContactIds {
    /// `None` when no non-blank id remains
    pub fn new(ids: impl IntoIterator<Item = String>) -> Option<Self> {
        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(Self(ids))
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    // Never empty by construction
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<ContactSelection> for ContactIds {
    type Error = ContactSelection;

    fn try_from(selection: ContactSelection) -> Result<Self, Self::Error> {
        ContactIds::new(selection.clone().into_ids()).ok_or(selection)
    }
}

/// Lists candidate contacts and links them to projects
pub struct ContactAssociationService {
    gateway: Arc<dyn CrmGateway>,
    settings: Arc<CrmSettings>,
}

impl ContactAssociationService {
    pub fn new(gateway: Arc<dyn CrmGateway>, settings: Arc<CrmSettings>) -> Self {
        Self { gateway, settings }
    }

    /// One page of contacts for the selection form
    pub async fn list_candidate_contacts(&self) -> Result<Vec<CandidateContact>, CrmError> {
        let contacts = self
            .gateway
            .list_contacts(PAGE_SIZE, &CANDIDATE_PROPERTIES)
            .await?;
        Ok(contacts.iter().map(CandidateContact::from).collect())
    }

    /// Link `project_id` to every id in `contact_ids` with one batch call
    pub async fn associate(
        &self,
        project_id: &str,
        contact_ids: &ContactIds,
    ) -> Result<(), CrmError> {
        let inputs = association_inputs(project_id, contact_ids, &self.settings.association_type);

        self.gateway
            .batch_create_associations(&self.settings.project_object_type, CONTACTS, &inputs)
            .await?;

        tracing::debug!(
            project_id = %project_id,
            contacts = contact_ids.len(),
            "Associated contacts with project"
        );

        Ok(())
    }
}

fn association_inputs(
    project_id: &str,
    contact_ids: &ContactIds,
    association_type: &str,
) -> Vec<AssociationInput> {
    contact_ids
        .as_slice()
        .iter()
        .map(|contact_id| AssociationInput {
            from_id: project_id.to_string(),
            to_id: contact_id.clone(),
            association_type: association_type.to_string(),
        })
        .collect()
}
