use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::errors::ApiError;
use crate::routes::ServerState;

/// `GET /images/:filename`: serve a stored image by filename. Resolution
/// only checks the uploads directory; association with a product is not
/// required to fetch a file.
pub async fn serve_image(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.catalogue.resolve_image(&filename).await?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!(error = %e, path = %path.display(), "resolved image became unreadable");
        ApiError::internal()
    })?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.as_ref())], bytes).into_response())
}
