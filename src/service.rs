//! Data-access facade used by every page and API handler.
//!
//! Reads are cached; every successful mutation drops the cached list and the
//! affected article so the next render sees the store's state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::post::{BlogPost, NewPost, PostPatch};
use crate::store::PostStore;

pub struct BlogService {
    store: Arc<dyn PostStore>,
    list_cache: RwLock<Option<Vec<BlogPost>>>,
    post_cache: RwLock<HashMap<String, BlogPost>>,
    /// Bumped on every invalidation; reads started before a bump don't fill the cache
    generation: AtomicU64,
}

impl BlogService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self {
            store,
            list_cache: RwLock::new(None),
            post_cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// All articles, newest first
    pub async fn all_posts(&self) -> Result<Vec<BlogPost>> {
        if let Ok(cache) = self.list_cache.read() {
            if let Some(posts) = cache.as_ref() {
                return Ok(posts.clone());
            }
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let rows = self.store.list().await.map_err(|e| {
            log::error!("Failed to fetch posts: {}", e);
            e
        })?;
        let mut posts: Vec<BlogPost> = rows.into_iter().map(BlogPost::from).collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        if let Ok(mut cache) = self.list_cache.write() {
            if self.generation.load(Ordering::SeqCst) == generation {
                *cache = Some(posts.clone());
            }
        }
        Ok(posts)
    }

    pub async fn post(&self, id: &str) -> Result<Option<BlogPost>> {
        if let Some(post) = self.post_cache.read().ok().and_then(|c| c.get(id).cloned()) {
            return Ok(Some(post));
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let post = self
            .store
            .get(id)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch post {}: {}", id, e);
                e
            })?
            .map(BlogPost::from);

        if let Some(post) = &post {
            if let Ok(mut cache) = self.post_cache.write() {
                if self.generation.load(Ordering::SeqCst) == generation {
                    cache.insert(post.id.clone(), post.clone());
                }
            }
        }
        Ok(post)
    }

    /// Like [`post`](Self::post), but a missing article is an error
    pub async fn require_post(&self, id: &str) -> Result<BlogPost> {
        self.post(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))
    }

    pub async fn create(&self, post: NewPost) -> Result<BlogPost> {
        let row = self.store.insert(&post).await.map_err(|e| {
            log::error!("Failed to create post: {}", e);
            e
        })?;
        self.invalidate(None);
        log::info!("published article {} ({})", row.id, row.title);
        Ok(row.into())
    }

    pub async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<BlogPost>> {
        let row = self.store.update(id, &patch).await.map_err(|e| {
            log::error!("Failed to update post {}: {}", id, e);
            e
        })?;
        self.invalidate(Some(id));
        Ok(row.map(BlogPost::from))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await.map_err(|e| {
            log::error!("Failed to delete post {}: {}", id, e);
            e
        })?;
        self.invalidate(Some(id));
        log::info!("deleted article {}", id);
        Ok(())
    }

    /// Drop the cached list and, if given, one cached article
    pub fn invalidate(&self, id: Option<&str>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut cache) = self.list_cache.write() {
            *cache = None;
        }
        if let Some(id) = id {
            if let Ok(mut cache) = self.post_cache.write() {
                cache.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::PostRow;
    use crate::store::FileStore;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Counts store reads on top of an in-memory store
    struct CountingStore {
        inner: FileStore,
        lists: AtomicUsize,
        gets: AtomicUsize,
    }

    #[async_trait]
    impl PostStore for CountingStore {
        async fn list(&self) -> Result<Vec<PostRow>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            self.inner.list().await
        }
        async fn get(&self, id: &str) -> Result<Option<PostRow>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.inner.get(id).await
        }
        async fn insert(&self, post: &NewPost) -> Result<PostRow> {
            self.inner.insert(post).await
        }
        async fn update(&self, id: &str, patch: &PostPatch) -> Result<Option<PostRow>> {
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: &str) -> Result<()> {
            self.inner.delete(id).await
        }
        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    fn service() -> (BlogService, Arc<CountingStore>) {
        let store = Arc::new(CountingStore {
            inner: FileStore::in_memory(),
            lists: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
        });
        (BlogService::new(store.clone()), store)
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.into(),
            content: "body".into(),
            excerpt: String::new(),
            author: "Sophie Martin".into(),
            tags: vec![],
            featured_image: None,
        }
    }

    #[tokio::test]
    async fn list_is_cached_until_a_mutation() {
        let (service, store) = service();
        service.all_posts().await.unwrap();
        service.all_posts().await.unwrap();
        assert_eq!(store.lists.load(Ordering::SeqCst), 1);

        service.create(new_post("Heritage")).await.unwrap();
        let posts = service.all_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(store.lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn update_invalidates_cached_post() {
        let (service, store) = service();
        let created = service.create(new_post("Before")).await.unwrap();
        service.post(&created.id).await.unwrap();
        service.post(&created.id).await.unwrap();
        assert_eq!(store.gets.load(Ordering::SeqCst), 1);

        let patch = PostPatch {
            title: Some("After".into()),
            ..Default::default()
        };
        service.update(&created.id, patch).await.unwrap();
        let post = service.post(&created.id).await.unwrap().unwrap();
        assert_eq!(post.title, "After");
        assert_eq!(store.gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn deleted_post_is_gone() {
        let (service, _) = service();
        let created = service.create(new_post("Doomed")).await.unwrap();
        service.post(&created.id).await.unwrap();
        service.delete(&created.id).await.unwrap();
        assert!(service.post(&created.id).await.unwrap().is_none());
        assert!(matches!(
            service.require_post(&created.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(service.all_posts().await.unwrap().is_empty());
    }

    /// Holds the first `list` open until released, after reading its rows
    struct SlowListStore {
        inner: FileStore,
        first: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl PostStore for SlowListStore {
        async fn list(&self) -> Result<Vec<PostRow>> {
            let rows = self.inner.list().await?;
            if self.first.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(rows)
        }
        async fn get(&self, id: &str) -> Result<Option<PostRow>> {
            self.inner.get(id).await
        }
        async fn insert(&self, post: &NewPost) -> Result<PostRow> {
            self.inner.insert(post).await
        }
        async fn update(&self, id: &str, patch: &PostPatch) -> Result<Option<PostRow>> {
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: &str) -> Result<()> {
            self.inner.delete(id).await
        }
        fn backend_name(&self) -> &'static str {
            "slow-list"
        }
    }

    #[tokio::test]
    async fn read_in_flight_during_a_write_does_not_cache_stale_rows() {
        let store = Arc::new(SlowListStore {
            inner: FileStore::in_memory(),
            first: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let service = Arc::new(BlogService::new(store.clone()));

        let reader = {
            let service = service.clone();
            tokio::spawn(async move { service.all_posts().await })
        };
        store.entered.notified().await;
        service.create(new_post("fresh")).await.unwrap();
        store.release.notify_one();

        let stale = reader.await.unwrap().unwrap();
        assert!(stale.is_empty());
        let posts = service.all_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "fresh");
    }
}
