use std::fs::{self, File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::PostStore;
use crate::error::{Error, Result};
use crate::post::{NewPost, PostPatch, PostRow};

/// Posts kept in memory and mirrored to a pretty-printed JSON file.
///
/// A write only becomes visible once the file has been rewritten.
#[derive(Debug)]
pub struct FileStore {
    path: Option<PathBuf>,
    rows: RwLock<Vec<PostRow>>,
}

impl FileStore {
    /// Load `path`, creating the file (and its directory) when missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_dir_all(dir)?;
        }
        let rows = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&data)?
            }
        } else {
            let mut file = File::create(&path)?;
            file.write_all(b"[]")?;
            Vec::new()
        };
        Ok(Self {
            path: Some(path),
            rows: RwLock::new(rows),
        })
    }

    /// Store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            rows: RwLock::new(Vec::new()),
        }
    }

    fn persist(&self, rows: &[PostRow]) -> Result<()> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(rows)?;
            fs::write(path, json)?;
        }
        Ok(())
    }

    fn poisoned() -> Error {
        Error::Io(std::io::Error::other("post store lock poisoned"))
    }
}

#[async_trait]
impl PostStore for FileStore {
    async fn list(&self) -> Result<Vec<PostRow>> {
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        let mut sorted = rows.clone();
        sorted.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(sorted)
    }

    async fn get(&self, id: &str) -> Result<Option<PostRow>> {
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn insert(&self, post: &NewPost) -> Result<PostRow> {
        let now = Utc::now();
        let row = PostRow {
            id: Uuid::new_v4().to_string(),
            title: post.title.clone(),
            content: post.content.clone(),
            excerpt: Some(post.excerpt.clone()),
            author: post.author.clone(),
            published_at: now,
            updated_at: now,
            tags: Some(post.tags.clone()),
            featured_image: post.featured_image.clone(),
        };

        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let mut next = rows.clone();
        next.push(row.clone());
        self.persist(&next)?;
        *rows = next;
        Ok(row)
    }

    async fn update(&self, id: &str, patch: &PostPatch) -> Result<Option<PostRow>> {
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let mut next = rows.clone();
        let Some(row) = next.iter_mut().find(|row| row.id == id) else {
            return Ok(None);
        };

        // Same filtering the hosted store applies to the update body.
        let changes = patch.update_row();
        if changes.contains_key("title") {
            row.title = patch.title.clone().unwrap_or_default();
        }
        if changes.contains_key("content") {
            row.content = patch.content.clone().unwrap_or_default();
        }
        if changes.contains_key("excerpt") {
            row.excerpt = patch.excerpt.clone();
        }
        if changes.contains_key("author") {
            row.author = patch.author.clone().unwrap_or_default();
        }
        if changes.contains_key("tags") {
            row.tags = patch.tags.clone();
        }
        if changes.contains_key("featured_image") {
            row.featured_image = patch.featured_image.clone();
        }
        row.updated_at = Utc::now();

        let updated = row.clone();
        self.persist(&next)?;
        *rows = next;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let mut next = rows.clone();
        next.retain(|row| row.id != id);
        self.persist(&next)?;
        *rows = next;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        if self.path.is_some() { "file" } else { "memory" }
    }
}
