use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use serde::Serialize;
use tokio::fs;
use tracing::debug;

use models::Product;

use crate::errors::CatalogueError;
use crate::storage::catalogue_store::CatalogueStore;

/// Acknowledgement returned by an image assignment.
#[derive(Clone, Debug, Serialize)]
pub struct AssignAck {
    pub message: String,
    pub filename: String,
}

impl AssignAck {
    pub fn new(filename: &str) -> Self {
        Self { message: "Image assigned successfully".into(), filename: filename.to_string() }
    }
}

/// Business operations over the catalogue: search by pid set, associate an
/// uploaded image with a product, and resolve stored image filenames to
/// paths. The store is its only dependency; file bytes are written by the
/// HTTP upload handler before `assign_image` is called.
#[derive(Clone)]
pub struct CatalogueService {
    store: Arc<CatalogueStore>,
    uploads_dir: PathBuf,
}

impl CatalogueService {
    pub fn new(store: Arc<CatalogueStore>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self { store, uploads_dir: uploads_dir.into() }
    }

    /// Filter the catalogue to products whose pid is in the input set.
    /// Results keep catalogue order, not input order; unknown pids simply
    /// yield nothing and an empty input yields an empty result.
    pub async fn search(&self, pids: &[String]) -> Vec<Product> {
        self.store
            .list()
            .await
            .into_iter()
            .filter(|p| pids.iter().any(|pid| *pid == p.pid))
            .collect()
    }

    /// Point a product at a freshly uploaded file, deleting the file it
    /// previously referenced so replaced images do not pile up on disk.
    ///
    /// An unknown pid is not an error: the ack is returned anyway and the
    /// uploaded file stays behind unreferenced. The missing-product case is
    /// logged at debug level so orphans are visible in the logs.
    pub async fn assign_image(
        &self,
        pid: &str,
        stored_filename: &str,
    ) -> Result<AssignAck, CatalogueError> {
        let Some(product) = self.store.find_by_pid(pid).await else {
            debug!(%pid, filename = %stored_filename, "assign for unknown pid, upload left unreferenced");
            return Ok(AssignAck::new(stored_filename));
        };

        if let Some(old) = &product.image {
            let old_path = self.uploads_dir.join(old);
            match fs::remove_file(&old_path).await {
                Ok(()) => debug!(%pid, old = %old, "replaced image removed"),
                // already gone is fine; the reference was stale
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CatalogueError::storage_write(old_path.display(), e)),
            }
        }

        self.store
            .update(|items| {
                if let Some(p) = items.iter_mut().find(|p| p.pid == pid) {
                    p.image = Some(stored_filename.to_string());
                }
                Ok(())
            })
            .await?;

        Ok(AssignAck::new(stored_filename))
    }

    /// Resolve a stored image filename to its path, or `ImageNotFound`.
    /// Deliberately does not consult the product list: any file present in
    /// the uploads directory is servable regardless of association.
    pub async fn resolve_image(&self, filename: &str) -> Result<PathBuf, CatalogueError> {
        let path = self.uploads_dir.join(filename);
        if fs::metadata(&path).await.is_ok() {
            Ok(path)
        } else {
            Err(CatalogueError::ImageNotFound(filename.to_string()))
        }
    }

    /// Two-slot convenience lookup. Both pids are required; each slot
    /// resolves independently and an unknown pid yields an empty slot.
    pub async fn lookup_pair(
        &self,
        pid1: Option<&str>,
        pid2: Option<&str>,
    ) -> Result<(Option<Product>, Option<Product>), CatalogueError> {
        let pid1 = pid1.ok_or(CatalogueError::MissingParameter("pid1"))?;
        let pid2 = pid2.ok_or(CatalogueError::MissingParameter("pid2"))?;
        Ok((self.store.find_by_pid(pid1).await, self.store.find_by_pid(pid2).await))
    }
}
