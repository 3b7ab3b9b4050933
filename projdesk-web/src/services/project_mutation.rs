//! Project create / update / archive
//!
//! Write path per project:
//! - New --save(no id)--> created
//! - Loaded(id) --save(id)--> updated
//! - New / Loaded(id) --delete--> archived
//!
//! Every outcome ends in a redirect to the listing. There is no version check;
//! concurrent updates to the same id are last-write-wins at the CRM.

use super::{CrmSettings, Project, PROJECT_PROPERTIES};
use crate::crm::{CrmError, CrmGateway, PropertyMap};
use serde::Deserialize;
use std::sync::Arc;

/// Editable project fields, as submitted by the form
///
/// Values are passed through unchanged; empty strings included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

impl ProjectFields {
    pub fn to_properties(&self) -> PropertyMap {
        PropertyMap::from([
            ("name".to_string(), self.name.clone()),
            ("description".to_string(), self.description.clone()),
            ("status".to_string(), self.status.clone()),
        ])
    }
}

/// What the edit form starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditContext {
    /// Blank form; submitting creates a project
    New,
    /// Form pre-filled from the CRM; submitting updates this project
    Loaded(Project),
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Updated(String),
}

/// Treat a blank path id the same as a missing one
fn present(id: Option<&str>) -> Option<&str> {
    id.map(str::trim).filter(|id| !id.is_empty())
}

/// Applies writes to single project records
pub struct ProjectMutationService {
    gateway: Arc<dyn CrmGateway>,
    settings: Arc<CrmSettings>,
}

impl ProjectMutationService {
    pub fn new(gateway: Arc<dyn CrmGateway>, settings: Arc<CrmSettings>) -> Self {
        Self { gateway, settings }
    }

    /// Load the edit form context; `CrmError::NotFound` if `id` does not resolve
    pub async fn load_for_edit(&self, id: Option<&str>) -> Result<EditContext, CrmError> {
        let Some(id) = present(id) else {
            return Ok(EditContext::New);
        };

        let obj = self
            .gateway
            .get_object(&self.settings.project_object_type, id, &PROJECT_PROPERTIES)
            .await?;

        Ok(EditContext::Loaded(Project::from(&obj)))
    }

    /// Update when `id` is given, create otherwise. Exactly one CRM call.
    pub async fn save(
        &self,
        id: Option<&str>,
        fields: &ProjectFields,
    ) -> Result<SaveOutcome, CrmError> {
        let object_type = &self.settings.project_object_type;
        let properties = fields.to_properties();

        match present(id) {
            Some(id) => {
                let updated = self
                    .gateway
                    .update_object(object_type, id, &properties)
                    .await?;
                Ok(SaveOutcome::Updated(updated.id))
            }
            None => {
                let created = self.gateway.create_object(object_type, &properties).await?;
                Ok(SaveOutcome::Created(created.id))
            }
        }
    }

    /// Archive (soft-delete) a project
    pub async fn delete(&self, id: &str) -> Result<(), CrmError> {
        self.gateway
            .archive_object(&self.settings.project_object_type, id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_treats_blank_as_missing() {
        assert_eq!(present(None), None);
        assert_eq!(present(Some("")), None);
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(Some("42")), Some("42"));
    }

    #[test]
    fn test_fields_to_properties_keeps_empty_strings() {
        let fields = ProjectFields {
            name: "X".into(),
            description: String::new(),
            status: "Z".into(),
        };
        let props = fields.to_properties();
        assert_eq!(props.len(), 3);
        assert_eq!(props["name"], "X");
        assert_eq!(props["description"], "");
        assert_eq!(props["status"], "Z");
    }
}
