use std::{io::ErrorKind, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use models::{default_catalogue, Product};

use crate::errors::CatalogueError;

/// JSON file-backed product catalogue.
///
/// Holds the ordered product list in memory and mirrors it to a single
/// pretty-printed JSON file, rewriting the whole file after every mutation.
/// Writes are not atomic (no temp-then-rename) and nothing coordinates two
/// store instances sharing one file; see DESIGN.md for the accepted
/// limitations.
#[derive(Clone)]
pub struct CatalogueStore {
    inner: Arc<RwLock<Vec<Product>>>,
    file_path: PathBuf,
}

impl CatalogueStore {
    /// Open the catalogue file, seeding it with the default product list if
    /// it does not exist yet. An existing file that fails to parse is a hard
    /// error; there is no partial recovery over a corrupt catalogue.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, CatalogueError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let catalogue: Vec<Product> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| CatalogueError::storage_read(file_path.display(), e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let seed = default_catalogue();
                let data = serde_json::to_vec_pretty(&seed)
                    .map_err(|e| CatalogueError::storage_write(file_path.display(), e))?;
                fs::write(&file_path, data)
                    .await
                    .map_err(|e| CatalogueError::storage_write(file_path.display(), e))?;
                seed
            }
            Err(e) => return Err(CatalogueError::storage_read(file_path.display(), e)),
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(catalogue)), file_path }))
    }

    /// Serialize the full list pretty-printed and overwrite the file.
    async fn save(&self) -> Result<(), CatalogueError> {
        let items = self.inner.read().await;
        let data = serde_json::to_vec_pretty(&*items)
            .map_err(|e| CatalogueError::storage_write(self.file_path.display(), e))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| CatalogueError::storage_write(self.file_path.display(), e))?;
        Ok(())
    }

    /// Clone of the full catalogue in file order.
    pub async fn list(&self) -> Vec<Product> {
        self.inner.read().await.clone()
    }

    /// Linear scan; duplicate pids resolve to the first match.
    pub async fn find_by_pid(&self, pid: &str) -> Option<Product> {
        let items = self.inner.read().await;
        items.iter().find(|p| p.pid == pid).cloned()
    }

    /// Apply a mutation to the list and persist. The in-memory change is
    /// kept even when the subsequent save fails; the caller sees the error.
    pub async fn update<F>(&self, f: F) -> Result<(), CatalogueError>
    where
        F: FnOnce(&mut Vec<Product>) -> Result<(), CatalogueError>,
    {
        let mut items = self.inner.write().await;
        f(&mut items)?;
        drop(items);
        self.save().await
    }
}
