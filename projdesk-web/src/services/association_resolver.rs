//! Association-aware project listing
//!
//! Fetches one page of projects with their contact associations expanded,
//! resolves the associated contacts with batched reads and merges them into
//! [`ProjectView`]s. Any gateway failure fails the whole listing.

use super::{CrmSettings, Project, PAGE_SIZE, PROJECT_PROPERTIES};
use crate::crm::{CrmError, CrmGateway, CrmObject, CONTACTS};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Contact properties shown in the listing
pub const CONTACT_SUMMARY_PROPERTIES: [&str; 2] = ["firstname", "lastname"];

/// How associated contact ids are grouped into batch reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// One batch read for every id on the page
    #[default]
    PerPage,
    /// One batch read per project, issued concurrently
    PerProject,
}

impl FromStr for BatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-page" | "per_page" | "page" => Ok(BatchPolicy::PerPage),
            "per-project" | "per_project" | "project" => Ok(BatchPolicy::PerProject),
            other => Err(format!(
                "unknown batch policy '{other}' (expected 'per-page' or 'per-project')"
            )),
        }
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchPolicy::PerPage => write!(f, "per-page"),
            BatchPolicy::PerProject => write!(f, "per-project"),
        }
    }
}

/// Contact as shown next to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSummary {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<&CrmObject> for ContactSummary {
    fn from(obj: &CrmObject) -> Self {
        Self {
            id: obj.id.clone(),
            firstname: obj.property("firstname").to_string(),
            lastname: obj.property("lastname").to_string(),
        }
    }
}

/// Request-scoped view model: a project with its resolved contacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectView {
    pub project: Project,
    pub contacts: Vec<ContactSummary>,
}

/// Contacts from batch reads, keyed by id
type ContactIndex = HashMap<String, ContactSummary>;

fn index_contacts(objects: &[CrmObject]) -> ContactIndex {
    objects
        .iter()
        .map(|obj| (obj.id.clone(), ContactSummary::from(obj)))
        .collect()
}

/// Order `index` entries by `ids` (association order)
///
/// Ids the batch read did not return (e.g. archived contacts) are skipped.
fn merge_contacts(ids: &[String], index: &ContactIndex) -> Vec<ContactSummary> {
    ids.iter()
        .filter_map(|id| {
            let contact = index.get(id).cloned();
            if contact.is_none() {
                tracing::debug!(contact_id = %id, "Associated contact missing from batch read");
            }
            contact
        })
        .collect()
}

/// Every associated id on the page, first occurrence order, without repeats
fn page_contact_ids(objects: &[CrmObject]) -> Vec<String> {
    let mut seen = HashSet::new();
    objects
        .iter()
        .filter_map(|obj| obj.associated_ids(CONTACTS))
        .flatten()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Builds the project listing
pub struct AssociationResolver {
    gateway: Arc<dyn CrmGateway>,
    settings: Arc<CrmSettings>,
}

impl AssociationResolver {
    pub fn new(gateway: Arc<dyn CrmGateway>, settings: Arc<CrmSettings>) -> Self {
        Self { gateway, settings }
    }

    /// Fetch one page of projects and resolve their contacts
    pub async fn list_projects(&self) -> Result<Vec<ProjectView>, CrmError> {
        let objects = self
            .gateway
            .list_objects(
                &self.settings.project_object_type,
                PAGE_SIZE,
                &PROJECT_PROPERTIES,
                &[CONTACTS],
            )
            .await?;

        let views = match self.settings.batch_policy {
            BatchPolicy::PerPage => self.resolve_per_page(&objects).await?,
            BatchPolicy::PerProject => self.resolve_per_project(&objects).await?,
        };

        tracing::debug!(
            projects = views.len(),
            contacts = views.iter().map(|v| v.contacts.len()).sum::<usize>(),
            policy = %self.settings.batch_policy,
            "Resolved project listing"
        );

        Ok(views)
    }

    async fn resolve_per_page(&self, objects: &[CrmObject]) -> Result<Vec<ProjectView>, CrmError> {
        let ids = page_contact_ids(objects);

        let index = if ids.is_empty() {
            ContactIndex::new()
        } else {
            let contacts = self
                .gateway
                .batch_read_contacts(&ids, &CONTACT_SUMMARY_PROPERTIES)
                .await?;
            index_contacts(&contacts)
        };

        Ok(objects
            .iter()
            .map(|obj| ProjectView {
                project: Project::from(obj),
                contacts: obj
                    .associated_ids(CONTACTS)
                    .map(|ids| merge_contacts(&ids, &index))
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn resolve_per_project(
        &self,
        objects: &[CrmObject],
    ) -> Result<Vec<ProjectView>, CrmError> {
        try_join_all(objects.iter().map(|obj| self.resolve_one(obj))).await
    }

    async fn resolve_one(&self, obj: &CrmObject) -> Result<ProjectView, CrmError> {
        let contacts = match obj.associated_ids(CONTACTS) {
            None => Vec::new(),
            Some(ids) => {
                let contacts = self
                    .gateway
                    .batch_read_contacts(&ids, &CONTACT_SUMMARY_PROPERTIES)
                    .await?;
                merge_contacts(&ids, &index_contacts(&contacts))
            }
        };

        Ok(ProjectView {
            project: Project::from(obj),
            contacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> CrmObject {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_batch_policy_parse() {
        assert_eq!("per-page".parse::<BatchPolicy>(), Ok(BatchPolicy::PerPage));
        assert_eq!("Per-Project".parse::<BatchPolicy>(), Ok(BatchPolicy::PerProject));
        assert!("per-contact".parse::<BatchPolicy>().is_err());
        assert_eq!(BatchPolicy::default(), BatchPolicy::PerPage);
        assert_eq!(BatchPolicy::PerProject.to_string(), "per-project");
    }

    #[test]
    fn test_merge_follows_association_order() {
        let fetched = vec![
            object(json!({ "id": "c2", "properties": { "firstname": "Bo", "lastname": "B" } })),
            object(json!({ "id": "c1", "properties": { "firstname": "Al", "lastname": "A" } })),
        ];
        let ids = vec!["c1".to_string(), "c2".to_string()];

        let merged = merge_contacts(&ids, &index_contacts(&fetched));

        assert_eq!(
            merged.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            vec!["c1", "c2"]
        );
        assert_eq!(merged[0].firstname, "Al");
    }

    #[test]
    fn test_merge_skips_unreturned_ids() {
        let fetched = vec![object(json!({ "id": "c1", "properties": {} }))];
        let ids = vec!["c1".to_string(), "gone".to_string()];

        let merged = merge_contacts(&ids, &index_contacts(&fetched));

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].firstname, "");
    }

    #[test]
    fn test_page_contact_ids_dedupes_across_projects() {
        let objects = vec![
            object(json!({ "id": "p1", "associations": { "contacts": { "results": [
                { "id": "c1" }, { "id": "c2" }
            ]}}})),
            object(json!({ "id": "p2" })),
            object(json!({ "id": "p3", "associations": { "contacts": { "results": [
                { "id": "c2" }, { "id": "c3" }
            ]}}})),
        ];

        assert_eq!(page_contact_ids(&objects), vec!["c1", "c2", "c3"]);
    }
}
