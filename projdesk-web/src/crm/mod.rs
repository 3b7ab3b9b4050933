//! CRM Gateway
//!
//! Typed contract over the CRM object, contact and association endpoints.
//! Services depend on [`CrmGateway`] only; [`HubSpotClient`] is the production
//! implementation.

mod hubspot;

pub use hubspot::HubSpotClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Built-in CRM object type for contacts
pub const CONTACTS: &str = "contacts";

/// CRM gateway errors
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("CRM API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid CRM URL: {0}")]
    InvalidUrl(String),
}

impl CrmError {
    /// Text suitable for the error log
    ///
    /// CRM error bodies are JSON; they are pretty-printed when they parse.
    pub fn log_detail(&self) -> String {
        match self {
            CrmError::Api { status, body } => {
                let body = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| serde_json::to_string_pretty(&v).ok())
                    .unwrap_or_else(|| body.clone());
                format!("CRM API error {status}:\n{body}")
            }
            other => other.to_string(),
        }
    }
}

/// Property values to write. The CRM stores every property as a string.
pub type PropertyMap = BTreeMap<String, String>;

/// One CRM record as returned by read endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmObject {
    pub id: String,
    /// Requested properties; the CRM returns `null` for unset values
    #[serde(default)]
    pub properties: BTreeMap<String, Option<String>>,
    /// Only present when associations were requested and at least one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<BTreeMap<String, AssociationPage>>,
}

impl CrmObject {
    /// Property value, or "" when unset
    pub fn property(&self, name: &str) -> &str {
        self.properties
            .get(name)
            .and_then(|v| v.as_deref())
            .unwrap_or("")
    }

    /// Property value, or `None` when unset or empty
    pub fn optional_property(&self, name: &str) -> Option<&str> {
        Some(self.property(name)).filter(|v| !v.is_empty())
    }

    /// Ids of records associated under `to_type`, in CRM response order
    ///
    /// `None` when the association block is absent or holds no results.
    pub fn associated_ids(&self, to_type: &str) -> Option<Vec<String>> {
        let page = self.associations.as_ref()?.get(to_type)?;
        if page.results.is_empty() {
            return None;
        }
        Some(page.results.iter().map(|r| r.id.clone()).collect())
    }
}

/// Association block for one target type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationPage {
    #[serde(default)]
    pub results: Vec<AssociationRef>,
}

/// Reference to an associated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRef {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub association_type: Option<String>,
}

/// One link in a batch association request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationInput {
    pub from_id: String,
    pub to_id: String,
    pub association_type: String,
}

/// CRM operations the services rely on
#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Read one page of objects of `object_type`, expanding `associations`
    async fn list_objects(
        &self,
        object_type: &str,
        limit: usize,
        properties: &[&str],
        associations: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError>;

    /// Read a single object; `CrmError::NotFound` if the id does not resolve
    async fn get_object(
        &self,
        object_type: &str,
        id: &str,
        properties: &[&str],
    ) -> Result<CrmObject, CrmError>;

    async fn create_object(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<CrmObject, CrmError>;

    async fn update_object(
        &self,
        object_type: &str,
        id: &str,
        properties: &PropertyMap,
    ) -> Result<CrmObject, CrmError>;

    /// Soft-delete
    async fn archive_object(&self, object_type: &str, id: &str) -> Result<(), CrmError>;

    async fn batch_read_contacts(
        &self,
        ids: &[String],
        properties: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError>;

    async fn list_contacts(
        &self,
        limit: usize,
        properties: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError>;

    /// Create every link in `inputs` in one call; all-or-nothing
    async fn batch_create_associations(
        &self,
        from_type: &str,
        to_type: &str,
        inputs: &[AssociationInput],
    ) -> Result<(), CrmError>;
}
