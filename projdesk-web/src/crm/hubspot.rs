//! HubSpot CRM v3 client
//!
//! Thin reqwest wrapper over the object, batch and association endpoints.
//! Authenticates with a private app access token (bearer).

use super::{AssociationInput, CrmError, CrmGateway, CrmObject, PropertyMap, CONTACTS};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("projdesk-web/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on inputs per batch read call
pub const BATCH_READ_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    results: Vec<CrmObject>,
}

#[derive(Debug, Serialize)]
struct PropertiesBody<'a> {
    properties: &'a PropertyMap,
}

#[derive(Debug, Serialize)]
struct ObjectId<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchReadBody<'a> {
    inputs: Vec<ObjectId<'a>>,
    properties: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct AssociationLink<'a> {
    from: ObjectId<'a>,
    to: ObjectId<'a>,
    #[serde(rename = "type")]
    association_type: &'a str,
}

#[derive(Debug, Serialize)]
struct BatchAssociationBody<'a> {
    inputs: Vec<AssociationLink<'a>>,
}

/// Error summary of a batch write response
///
/// HubSpot answers `207 Multi-Status` when some inputs failed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchStatus {
    #[serde(default)]
    num_errors: usize,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

impl BatchStatus {
    fn has_errors(&self) -> bool {
        self.num_errors > 0 || !self.errors.is_empty()
    }
}

/// HubSpot CRM API client
pub struct HubSpotClient {
    http_client: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl HubSpotClient {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self, CrmError> {
        let base_url = Url::parse(base_url).map_err(|e| CrmError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(CrmError::InvalidUrl(base_url.to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CrmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            access_token: access_token.into(),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        tracing::debug!(method = %method, url = %url, "Calling CRM API");
        self.http_client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Send and map non-success statuses to `CrmError`
    ///
    /// A 404 becomes `NotFound(not_found_id)` when an id is given.
    async fn send(
        &self,
        request: RequestBuilder,
        not_found_id: Option<&str>,
    ) -> Result<Response, CrmError> {
        let response = request
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = not_found_id {
                return Err(CrmError::NotFound(id.to_string()));
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        not_found_id: Option<&str>,
    ) -> Result<T, CrmError> {
        self.send(request, not_found_id)
            .await?
            .json()
            .await
            .map_err(|e| CrmError::Parse(e.to_string()))
    }

    async fn batch_read_chunk(
        &self,
        ids: &[String],
        properties: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError> {
        let body = BatchReadBody {
            inputs: ids.iter().map(|id| ObjectId { id }).collect(),
            properties,
        };
        let request = self
            .request(Method::POST, &["crm", "v3", "objects", CONTACTS, "batch", "read"])
            .json(&body);
        let response: CollectionResponse = self.send_json(request, None).await?;
        Ok(response.results)
    }
}

#[async_trait]
impl CrmGateway for HubSpotClient {
    async fn list_objects(
        &self,
        object_type: &str,
        limit: usize,
        properties: &[&str],
        associations: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError> {
        let mut query = vec![
            ("limit", limit.to_string()),
            ("properties", properties.join(",")),
            ("archived", "false".to_string()),
        ];
        if !associations.is_empty() {
            query.push(("associations", associations.join(",")));
        }

        let request = self
            .request(Method::GET, &["crm", "v3", "objects", object_type])
            .query(&query);
        let response: CollectionResponse = self.send_json(request, None).await?;

        tracing::debug!(
            object_type = %object_type,
            count = response.results.len(),
            "Listed CRM objects"
        );

        Ok(response.results)
    }

    async fn get_object(
        &self,
        object_type: &str,
        id: &str,
        properties: &[&str],
    ) -> Result<CrmObject, CrmError> {
        let request = self
            .request(Method::GET, &["crm", "v3", "objects", object_type, id])
            .query(&[("properties", properties.join(","))]);
        self.send_json(request, Some(id)).await
    }

    async fn create_object(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<CrmObject, CrmError> {
        let request = self
            .request(Method::POST, &["crm", "v3", "objects", object_type])
            .json(&PropertiesBody { properties });
        let created: CrmObject = self.send_json(request, None).await?;

        tracing::info!(object_type = %object_type, id = %created.id, "Created CRM object");

        Ok(created)
    }

    async fn update_object(
        &self,
        object_type: &str,
        id: &str,
        properties: &PropertyMap,
    ) -> Result<CrmObject, CrmError> {
        let request = self
            .request(Method::PATCH, &["crm", "v3", "objects", object_type, id])
            .json(&PropertiesBody { properties });
        let updated: CrmObject = self.send_json(request, Some(id)).await?;

        tracing::info!(object_type = %object_type, id = %id, "Updated CRM object");

        Ok(updated)
    }

    async fn archive_object(&self, object_type: &str, id: &str) -> Result<(), CrmError> {
        let request = self.request(Method::DELETE, &["crm", "v3", "objects", object_type, id]);
        self.send(request, Some(id)).await?;

        tracing::info!(object_type = %object_type, id = %id, "Archived CRM object");

        Ok(())
    }

    async fn batch_read_contacts(
        &self,
        ids: &[String],
        properties: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = ids
            .chunks(BATCH_READ_LIMIT)
            .map(|chunk| self.batch_read_chunk(chunk, properties));
        let results = try_join_all(chunks).await?;

        Ok(results.into_iter().flatten().collect())
    }

    async fn list_contacts(
        &self,
        limit: usize,
        properties: &[&str],
    ) -> Result<Vec<CrmObject>, CrmError> {
        let request = self
            .request(Method::GET, &["crm", "v3", "objects", CONTACTS])
            .query(&[
                ("limit", limit.to_string()),
                ("properties", properties.join(",")),
                ("archived", "false".to_string()),
            ]);
        let response: CollectionResponse = self.send_json(request, None).await?;
        Ok(response.results)
    }

    async fn batch_create_associations(
        &self,
        from_type: &str,
        to_type: &str,
        inputs: &[AssociationInput],
    ) -> Result<(), CrmError> {
        let body = BatchAssociationBody {
            inputs: inputs
                .iter()
                .map(|input| AssociationLink {
                    from: ObjectId { id: &input.from_id },
                    to: ObjectId { id: &input.to_id },
                    association_type: &input.association_type,
                })
                .collect(),
        };
        let request = self
            .request(
                Method::POST,
                &["crm", "v3", "associations", from_type, to_type, "batch", "create"],
            )
            .json(&body);
        let response = self.send(request, None).await?;

        // A batch write is all-or-nothing to callers
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;
        let batch: BatchStatus = serde_json::from_str(&body).unwrap_or_default();
        if status == StatusCode::MULTI_STATUS || batch.has_errors() {
            return Err(CrmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            from_type = %from_type,
            to_type = %to_type,
            count = inputs.len(),
            "Created CRM associations"
        );

        Ok(())
    }
}
