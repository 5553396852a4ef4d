use std::path::Path;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use models::Product;
use service::catalogue::AssignAck;

use crate::errors::ApiError;
use crate::routes::ServerState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Absent `pids` behaves as an empty set, not an error.
    #[serde(default)]
    pub pids: Vec<String>,
}

/// `POST /search`: filter the catalogue by pid membership.
pub async fn search_products(
    State(state): State<ServerState>,
    Json(req): Json<SearchRequest>,
) -> Json<Vec<Product>> {
    let found = state.catalogue.search(&req.pids).await;
    debug!(requested = req.pids.len(), matched = found.len(), "search filtered products");
    Json(found)
}

/// Upload intake: name the file `{pid}_{timestamp}{ext}`, falling back to
/// `image_{timestamp}{ext}` when no pid accompanied the upload. The
/// extension is carried over from the client filename and may be empty.
fn stored_filename(pid: Option<&str>, original_name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let ext = Path::new(original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    match pid {
        Some(pid) => format!("{pid}_{timestamp}{ext}"),
        None => format!("image_{timestamp}{ext}"),
    }
}

/// `POST /upload`: store the uploaded bytes, then associate the stored
/// filename with the product. The file lands on disk before the catalogue
/// is touched; an unknown pid still acks and leaves the file unreferenced.
pub async fn upload_image(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<AssignAck>, ApiError> {
    let mut pid: Option<String> = None;
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("pid") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable pid field: {e}")))?;
                pid = Some(value);
            }
            Some("image") => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("unreadable image field: {e}")))?;
                let filename = stored_filename(pid.as_deref(), &original_name);
                let target = state.uploads_dir.join(&filename);
                tokio::fs::write(&target, &bytes).await.map_err(|e| {
                    error!(error = %e, path = %target.display(), "failed to store upload");
                    ApiError::internal()
                })?;
                stored = Some(filename);
            }
            _ => {}
        }
    }

    let Some(filename) = stored else {
        return Err(ApiError::bad_request("missing parameter: image"));
    };

    let ack = match pid {
        Some(pid) => state.catalogue.assign_image(&pid, &filename).await?,
        // no pid at all: the file is stored under the fallback name and
        // nothing is assigned
        None => AssignAck::new(&filename),
    };
    Ok(Json(ack))
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub pid1: Option<String>,
    pub pid2: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ComparedProduct {
    pub pid: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub product1: Option<ComparedProduct>,
    pub product2: Option<ComparedProduct>,
}

fn compared(base_url: &str, product: Product) -> ComparedProduct {
    let image_url = product.image.map(|f| format!("{base_url}/images/{f}"));
    ComparedProduct { pid: product.pid, name: product.name, image_url }
}

/// `GET /compare`: fixed two-slot lookup. Both parameters
/// are required; a pid with no matching product yields a null slot.
pub async fn compare_products(
    State(state): State<ServerState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<CompareResponse>, ApiError> {
    let (p1, p2) = state
        .catalogue
        .lookup_pair(params.pid1.as_deref(), params.pid2.as_deref())
        .await?;
    Ok(Json(CompareResponse {
        product1: p1.map(|p| compared(&state.public_base_url, p)),
        product2: p2.map(|p| compared(&state.public_base_url, p)),
    }))
}
