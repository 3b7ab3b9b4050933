//! Contact selection and association views

use axum::{
    async_trait,
    extract::{FromRequest, Path, Request, State},
    http::header::CONTENT_TYPE,
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;
use tracing::info;

use super::ui;
use crate::error::{ApiError, ApiResult};
use crate::services::{ContactIds, ContactSelection};
use crate::AppState;

/// Form field carrying the selected contact ids
pub const CONTACT_IDS_FIELD: &str = "contactIds";

#[derive(Debug, Deserialize)]
struct JsonSelection {
    #[serde(rename = "contactIds")]
    contact_ids: Option<ContactSelection>,
}

/// Contact ids submitted to POST /add-contact/:projectId
///
/// Accepts a urlencoded form (`contactIds` repeated once per checked box) or a
/// JSON body where `contactIds` is a single id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedContacts(pub ContactSelection);

#[async_trait]
impl<S> FromRequest<S> for SelectedContacts
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(body) = Json::<JsonSelection>::from_request(req, state)
                .await
                .map_err(|_| ApiError::BadRequest("Invalid contact selection"))?;
            let selection = body
                .contact_ids
                .unwrap_or_else(|| ContactSelection::Many(Vec::new()));
            return Ok(Self(selection));
        }

        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|_| ApiError::BadRequest("Invalid contact selection"))?;
        let mut ids: Vec<String> = pairs
            .into_iter()
            .filter(|(key, _)| key == CONTACT_IDS_FIELD || key == "contactIds[]")
            .map(|(_, value)| value)
            .collect();

        let selection = if ids.len() == 1 {
            ContactSelection::One(ids.remove(0))
        } else {
            ContactSelection::Many(ids)
        };
        Ok(Self(selection))
    }
}

/// GET /add-contact/:projectId
pub async fn add_contact_form(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Html<String>> {
    let candidates = state
        .contacts
        .list_candidate_contacts()
        .await
        .map_err(|e| ApiError::crm("Error retrieving contacts", e))?;

    Ok(Html(ui::add_contact_page(&project_id, &candidates)))
}

/// POST /add-contact/:projectId
///
/// One batch association call for the whole selection.
pub async fn add_contacts(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    SelectedContacts(selection): SelectedContacts,
) -> ApiResult<Redirect> {
    let contact_ids = ContactIds::try_from(selection)
        .map_err(|_| ApiError::BadRequest("No contacts selected"))?;

    state
        .contacts
        .associate(&project_id, &contact_ids)
        .await
        .map_err(|e| ApiError::crm("Error associating contacts", e))?;

    info!(
        project_id = %project_id,
        contacts = contact_ids.len(),
        "Contacts associated"
    );

    Ok(Redirect::to("/"))
}
