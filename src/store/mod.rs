//! Post storage backends.
//!
//! - [`RestStore`]: hosted database reached through its PostgREST interface
//! - [`FileStore`]: local JSON file, used when no hosted store is configured

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StoreBackend;
use crate::error::Result;
use crate::post::{NewPost, PostPatch, PostRow};

mod file;
mod rest;

pub use file::FileStore;
pub use rest::RestStore;

/// Row-level access to the `blog_posts` table
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All rows, newest `published_at` first
    async fn list(&self) -> Result<Vec<PostRow>>;

    async fn get(&self, id: &str) -> Result<Option<PostRow>>;

    async fn insert(&self, post: &NewPost) -> Result<PostRow>;

    /// Returns `None` when no row has this id
    async fn update(&self, id: &str, patch: &PostPatch) -> Result<Option<PostRow>>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Name reported in logs
    fn backend_name(&self) -> &'static str;
}

/// Build the store selected by configuration
pub fn open_store(backend: &StoreBackend) -> Result<Arc<dyn PostStore>> {
    let store: Arc<dyn PostStore> = match backend {
        StoreBackend::Rest { url, key, table } => {
            Arc::new(RestStore::new(url.clone(), key.clone(), table.clone()))
        }
        StoreBackend::File { path } => Arc::new(FileStore::open(path)?),
    };
    log::info!("using {} post store", store.backend_name());
    Ok(store)
}
