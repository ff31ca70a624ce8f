use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::PostStore;
use crate::error::{Error, Result};
use crate::post::{NewPost, PostPatch, PostRow};

/// Client for a hosted Postgres table exposed through PostgREST
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct RemoteError {
    message: Option<String>,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: table.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn by_id(&self, request: RequestBuilder, id: &str) -> RequestBuilder {
        request.query(&[("id", format!("eq.{}", id))])
    }

    /// Turn a non-2xx response into [`Error::Remote`]
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RemoteError>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(body);
        Err(Error::remote(status.as_u16(), message))
    }

    async fn rows(request: RequestBuilder) -> Result<Vec<PostRow>> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<Vec<PostRow>>().await?)
    }
}

#[async_trait]
impl PostStore for RestStore {
    async fn list(&self) -> Result<Vec<PostRow>> {
        let request = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "*"), ("order", "published_at.desc")]);
        Self::rows(request).await.inspect_err(|e| {
            log::error!("Error fetching posts: {}", e);
        })
    }

    async fn get(&self, id: &str) -> Result<Option<PostRow>> {
        let request = self.by_id(
            self.authorized(self.client.get(self.table_url()))
                .query(&[("select", "*")]),
            id,
        );
        let rows = Self::rows(request).await.inspect_err(|e| {
            log::error!("Error fetching post {}: {}", id, e);
        })?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, post: &NewPost) -> Result<PostRow> {
        let request = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&post.insert_row());
        let rows = Self::rows(request).await.inspect_err(|e| {
            log::error!("Error creating post: {}", e);
        })?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::remote(200, "insert returned no row"))
    }

    async fn update(&self, id: &str, patch: &PostPatch) -> Result<Option<PostRow>> {
        let request = self
            .by_id(self.authorized(self.client.patch(self.table_url())), id)
            .header("Prefer", "return=representation")
            .json(&patch.update_row());
        let rows = Self::rows(request).await.inspect_err(|e| {
            log::error!("Error updating post {}: {}", id, e);
        })?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self.by_id(self.authorized(self.client.delete(self.table_url())), id);
        Self::check(request.send().await?).await.inspect_err(|e| {
            log::error!("Error deleting post {}: {}", id, e);
        })?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "hosted"
    }
}
