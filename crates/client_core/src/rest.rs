use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CategoryId, ProductCategory},
    error::ApiError,
    protocol::{SearchQuery, PRODUCT_CATEGORIES_PATH, PRODUCT_CATEGORIES_SEARCH_PATH},
};
use tracing::debug;

use crate::CategorySource;

pub struct ProductCategoryClient {
    http: Client,
    server_url: String,
    auth_token: Option<String>,
}

impl ProductCategoryClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), server_url)
    }

    pub fn with_http_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            server_url,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .http
            .request(method, format!("{}{path}", self.server_url));
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CategorySource for ProductCategoryClient {
    async fn query(&self) -> Result<Option<Vec<ProductCategory>>> {
        debug!(server_url = %self.server_url, "rest: query product categories");
        let response = self
            .request(Method::GET, PRODUCT_CATEGORIES_PATH)
            .send()
            .await
            .with_context(|| format!("GET {PRODUCT_CATEGORIES_PATH} failed"))?;
        read_optional_body(response).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Option<Vec<ProductCategory>>> {
        debug!(server_url = %self.server_url, search = %query.query, "rest: search product categories");
        let response = self
            .request(Method::GET, PRODUCT_CATEGORIES_SEARCH_PATH)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {PRODUCT_CATEGORIES_SEARCH_PATH} failed"))?;
        read_optional_body(response).await
    }

    async fn find(&self, id: CategoryId) -> Result<Option<ProductCategory>> {
        let path = format!("{PRODUCT_CATEGORIES_PATH}/{id}");
        let response = self
            .request(Method::GET, &path)
            .send()
            .await
            .with_context(|| format!("GET {path} failed"))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_optional_body(response).await
    }

    async fn delete(&self, id: CategoryId) -> Result<()> {
        let path = format!("{PRODUCT_CATEGORIES_PATH}/{id}");
        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .with_context(|| format!("DELETE {path} failed"))?;
        ensure_success(response).await?;
        debug!(category_id = id.0, "rest: deleted product category");
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_body(status.as_u16(), &body).into())
}

async fn read_optional_body<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    parse_optional_body(&body)
}

fn parse_optional_body<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(body).context("invalid product category payload")
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
