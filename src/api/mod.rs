pub mod http;
pub mod memory;

use std::{future::Future, sync::Arc, time::Duration};

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::config::Config;

pub use http::HttpStore;
pub use memory::MemoryStore;

const RETRY_LIMIT: u32 = 2;

/// An entity living in a named remote collection
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    fn id(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("invalid store url: {0}")]
    InvalidUrl(String),

    #[error("store unreachable")]
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Equality filters, ordering and limit for a collection listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter.push((field.to_string(), value.into()));
        self
    }
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The remote document store the accessors talk to
pub trait RemoteStore: Send + Sync {
    fn list<T: Record>(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<T>, StoreError>> + Send;

    fn create<T: Record>(&self, record: &T) -> impl Future<Output = Result<T, StoreError>> + Send;

    /// Shallow merge of `patch` into the stored record
    fn update<T: Record>(
        &self,
        id: &str,
        patch: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete<T: Record>(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Shared HTTP client: transient retries plus a bound on in-flight requests
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl StoreClient {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout()))
            .build()?;
        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.limit().max(1))),
        })
    }
    pub async fn client(&self) -> (ClientWithMiddleware, Option<SemaphorePermit>) {
        // the semaphore is never closed, so a failed acquire only means "no permit"
        let permit = self.semaphore.acquire().await.ok();
        (self.client_without_semaphore(), permit)
    }
    fn client_without_semaphore(&self) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(RETRY_LIMIT);

        ClientBuilder::new(self.client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_builder_collects_parts() {
        let query = Query::new()
            .filter("userId", "u1")
            .order_by("createdAt", Direction::Desc)
            .limit(50);

        assert_eq!(query.filter, vec![("userId".to_string(), json!("u1"))]);
        assert_eq!(query.order_by.unwrap().direction.as_str(), "desc");
        assert_eq!(query.limit, Some(50));
    }
}
