//! Shared test helpers: a recording in-memory CRM gateway and a log capture

#![allow(dead_code)]

use async_trait::async_trait;
use projdesk_web::crm::{AssociationInput, CrmError, CrmGateway, CrmObject, PropertyMap};
use projdesk_web::services::{BatchPolicy, CrmSettings};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub const OBJECT_TYPE: &str = "2-1234567";
pub const ASSOCIATION_TYPE: &str = "project_to_contact";

/// Gateway call as recorded by [`FakeGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListObjects {
        object_type: String,
        limit: usize,
        properties: Vec<String>,
        associations: Vec<String>,
    },
    GetObject {
        object_type: String,
        id: String,
    },
    CreateObject {
        object_type: String,
        properties: PropertyMap,
    },
    UpdateObject {
        object_type: String,
        id: String,
        properties: PropertyMap,
    },
    ArchiveObject {
        object_type: String,
        id: String,
    },
    BatchReadContacts {
        ids: Vec<String>,
        properties: Vec<String>,
    },
    ListContacts {
        limit: usize,
    },
    BatchCreateAssociations {
        from_type: String,
        to_type: String,
        inputs: Vec<AssociationInput>,
    },
}

/// In-memory gateway that records every call
#[derive(Default)]
pub struct FakeGateway {
    pub projects: Vec<CrmObject>,
    pub contacts: Vec<CrmObject>,
    /// Every read fails with an API error
    pub fail_reads: bool,
    /// Every write fails with an API error
    pub fail_writes: bool,
    /// Batch contact reads fail, project listing succeeds
    pub fail_batch_reads: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(mut self, projects: Vec<CrmObject>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_contacts(mut self, contacts: Vec<CrmObject>) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_batch_reads(mut self) -> Self {
        self.fail_batch_reads = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn batch_reads(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::BatchReadContacts { ids, .. } => Some(ids),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn api_error() -> CrmError {
        CrmError::Api {
            status: 500,
            body: r#"{"status":"error","message":"boom"}"#.to_string(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[async_trait]
impl CrmGateway for FakeGateway {
    async fn list_objects(
        &self,
        object_type: &str,
        limit: usize,
        properties: &[&str],
        associations: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError> {
        self.record(Call::ListObjects {
            object_type: object_type.to_string(),
            limit,
            properties: strings(properties),
            associations: strings(associations),
        });
        if self.fail_reads {
            return Err(Self::api_error());
        }
        Ok(self.projects.iter().take(limit).cloned().collect())
    }

    async fn get_object(
        &self,
        object_type: &str,
        id: &str,
        _properties: &[&str],
    ) -> Result<CrmObject, CrmError> {
        self.record(Call::GetObject {
            object_type: object_type.to_string(),
            id: id.to_string(),
        });
        if self.fail_reads {
            return Err(Self::api_error());
        }
        self.projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CrmError::NotFound(id.to_string()))
    }

    async fn create_object(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<CrmObject, CrmError> {
        self.record(Call::CreateObject {
            object_type: object_type.to_string(),
            properties: properties.clone(),
        });
        if self.fail_writes {
            return Err(Self::api_error());
        }
        Ok(CrmObject {
            id: "new-1".to_string(),
            ..CrmObject::default()
        })
    }

    async fn update_object(
        &self,
        object_type: &str,
        id: &str,
        properties: &PropertyMap,
    ) -> Result<CrmObject, CrmError> {
        self.record(Call::UpdateObject {
            object_type: object_type.to_string(),
            id: id.to_string(),
            properties: properties.clone(),
        });
        if self.fail_writes {
            return Err(Self::api_error());
        }
        Ok(CrmObject {
            id: id.to_string(),
            ..CrmObject::default()
        })
    }

    async fn archive_object(&self, object_type: &str, id: &str) -> Result<(), CrmError> {
        self.record(Call::ArchiveObject {
            object_type: object_type.to_string(),
            id: id.to_string(),
        });
        if self.fail_writes {
            return Err(Self::api_error());
        }
        Ok(())
    }

    async fn batch_read_contacts(
        &self,
        ids: &[String],
        properties: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError> {
        self.record(Call::BatchReadContacts {
            ids: ids.to_vec(),
            properties: strings(properties),
        });
        if self.fail_reads || self.fail_batch_reads {
            return Err(Self::api_error());
        }
        // Reverse order: callers must not rely on batch response order
        Ok(self
            .contacts
            .iter()
            .rev()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_contacts(
        &self,
        limit: usize,
        _properties: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError> {
        self.record(Call::ListContacts { limit });
        if self.fail_reads {
            return Err(Self::api_error());
        }
        Ok(self.contacts.iter().take(limit).cloned().collect())
    }

    async fn batch_create_associations(
        &self,
        from_type: &str,
        to_type: &str,
        inputs: &[AssociationInput],
    ) -> Result<(), CrmError> {
        self.record(Call::BatchCreateAssociations {
            from_type: from_type.to_string(),
            to_type: to_type.to_string(),
            inputs: inputs.to_vec(),
        });
        if self.fail_writes {
            return Err(Self::api_error());
        }
        Ok(())
    }
}

/// Project record with `contact_ids` in its association block
pub fn project(id: &str, name: &str, contact_ids: &[&str]) -> CrmObject {
    let mut value = json!({
        "id": id,
        "properties": {
            "name": name,
            "description": format!("{name} description"),
            "status": "In progress"
        }
    });
    if !contact_ids.is_empty() {
        let results: Vec<_> = contact_ids
            .iter()
            .map(|c| json!({ "id": c, "type": ASSOCIATION_TYPE }))
            .collect();
        value["associations"] = json!({ "contacts": { "results": results } });
    }
    serde_json::from_value(value).unwrap()
}

pub fn contact(id: &str, firstname: &str, lastname: &str) -> CrmObject {
    serde_json::from_value(json!({
        "id": id,
        "properties": {
            "firstname": firstname,
            "lastname": lastname,
            "email": format!("{}@example.com", firstname.to_lowercase())
        }
    }))
    .unwrap()
}

pub fn settings(batch_policy: BatchPolicy) -> CrmSettings {
    CrmSettings {
        project_object_type: OBJECT_TYPE.to_string(),
        association_type: ASSOCIATION_TYPE.to_string(),
        batch_policy,
    }
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

pub struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(Arc::clone(&self.0))
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Route events on the current thread here until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }
}
