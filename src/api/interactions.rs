use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, AppState};
use crate::crm::types::{Interaction, NewInteraction};
use crate::crm::{contacts, interactions};
use crate::integrations::llm;
use crate::integrations::speech::upload_name;

/// A stored interaction plus, when the summarizer could not run, why.
#[derive(Debug, Serialize)]
pub struct InteractionCreated {
    #[serde(flatten)]
    pub interaction: Interaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewInteraction>,
) -> ApiResult<InteractionCreated> {
    let now = state.now();

    // Fail fast on an unknown contact before spending a model call.
    let contact_id = new.contact_id.clone();
    state
        .with_db(move |conn| contacts::get_contact(conn, &contact_id, now))
        .await?;

    let mut ai_error = None;
    let digest = match new.analyzable_text().filter(|t| llm::worth_summarizing(t)) {
        Some(text) => match llm::summarize_interaction(state.llm.as_ref(), text).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                tracing::warn!(contact_id = %new.contact_id, error = %e, "interaction stored without summary");
                ai_error = Some(e.to_string());
                None
            }
        },
        None => None,
    };

    let interaction = state
        .with_db(move |conn| interactions::create_interaction(conn, &new, digest.as_ref(), now))
        .await?;

    Ok(Json(InteractionCreated {
        interaction,
        ai_error,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

pub async fn list(
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Interaction>> {
    let limit = query.limit.clamp(1, 500);
    let rows = state
        .with_db(move |conn| interactions::list_for_contact(conn, &contact_id, limit))
        .await?;
    Ok(Json(rows))
}

/// `multipart/form-data` upload with a `file` field.
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<serde_json::Value> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = upload_name(field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::BadRequest("missing 'file' field".into()));
    };
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".into()));
    }

    let transcript = state.speech.transcribe(bytes.to_vec(), &filename).await?;
    Ok(Json(serde_json::json!({ "transcript": transcript })))
}
