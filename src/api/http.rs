use log::{debug, log_enabled, trace};
use reqwest::{header, Response, Url};
use reqwest_middleware::RequestBuilder;
use serde_json::Value;

use crate::config::Config;

use super::{Query, Record, RemoteStore, StoreClient, StoreError};

/// `RemoteStore` over a REST document API
///
/// Collections live at `{base}/{collection}` and records at `{base}/{collection}/{id}`.
#[derive(Debug, Clone)]
pub struct HttpStore {
    inner: StoreClient,
    base_url: Url,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let inner = StoreClient::new(config)?;
        let base_url = parse_base_url(config.store_url())?;
        Ok(Self {
            inner,
            base_url,
            token: config.token(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn wrap_request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn collection_url(&self, collection: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            urlencoding::encode(collection)
        );
        url.set_path(&path);
        url
    }

    fn record_url(&self, collection: &str, id: &str) -> Url {
        let mut url = self.collection_url(collection);
        let path = format!("{}/{}", url.path(), urlencoding::encode(id));
        url.set_path(&path);
        url
    }

    fn check(response: Response) -> Result<Response, StoreError> {
        Ok(response.error_for_status()?)
    }
}

impl RemoteStore for HttpStore {
    async fn list<T: Record>(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        let url = self.collection_url(T::COLLECTION);
        let (client, _permit) = self.inner.client().await;
        let request = self.wrap_request(client.get(url.clone()).query(&query_pairs(query)));

        debug!("GET {}", url);
        let response = Self::check(request.send().await?)?;
        let body = response.text().await?;
        if log_enabled!(log::Level::Trace) {
            trace!("{}", body);
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn create<T: Record>(&self, record: &T) -> Result<T, StoreError> {
        let url = self.collection_url(T::COLLECTION);
        let (client, _permit) = self.inner.client().await;
        let request = self.wrap_request(client.post(url.clone()).json(record));

        debug!("POST {} ({})", url, record.id());
        let response = Self::check(request.send().await?)?;
        Ok(response.json().await?)
    }

    async fn update<T: Record>(&self, id: &str, patch: Value) -> Result<(), StoreError> {
        let url = self.record_url(T::COLLECTION, id);
        let (client, _permit) = self.inner.client().await;
        let request = self.wrap_request(client.patch(url.clone()).json(&patch));

        debug!("PATCH {}", url);
        Self::check(request.send().await?)?;
        Ok(())
    }

    async fn delete<T: Record>(&self, id: &str) -> Result<(), StoreError> {
        let url = self.record_url(T::COLLECTION, id);
        let (client, _permit) = self.inner.client().await;
        let request = self.wrap_request(client.delete(url.clone()));

        debug!("DELETE {}", url);
        Self::check(request.send().await?)?;
        Ok(())
    }
}

fn parse_base_url(base: &str) -> Result<Url, StoreError> {
    let base = if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("http://{}", base)
    };
    Url::parse(base.trim_end_matches('/')).map_err(|_| StoreError::InvalidUrl(base))
}

/// `orderBy=field:dir`, `limit=N` and one pair per equality filter
fn query_pairs(query: &Query) -> Vec<(String, String)> {
    let mut pairs = vec![];
    if let Some(order) = &query.order_by {
        pairs.push((
            "orderBy".to_string(),
            format!("{}:{}", order.field, order.direction.as_str()),
        ));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }
    for (field, value) in &query.filter {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.push((field.clone(), value));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::api::Direction;

    #[test]
    fn query_pairs_encode_order_limit_and_filters() {
        let query = Query::new()
            .filter("userId", "u1")
            .filter("upvotes", 3)
            .order_by("createdAt", Direction::Desc)
            .limit(50);

        assert_eq!(
            query_pairs(&query),
            vec![
                ("orderBy".to_string(), "createdAt:desc".to_string()),
                ("limit".to_string(), "50".to_string()),
                ("userId".to_string(), "u1".to_string()),
                ("upvotes".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn record_urls_hang_off_the_base_path() {
        let config = Config::try_parse_from([
            "reddit-lite",
            "--store-url",
            "store.test/api/",
            "seed",
        ])
        .unwrap();
        let store = HttpStore::new(&config).unwrap();

        assert_eq!(store.base_url().as_str(), "http://store.test/api");
        assert_eq!(
            store.collection_url("userSubredditMemberships").as_str(),
            "http://store.test/api/userSubredditMemberships"
        );
        assert_eq!(
            store.record_url("posts", "post 1").as_str(),
            "http://store.test/api/posts/post%201"
        );
    }

    #[test]
    fn base_url_gets_a_scheme() {
        let url = parse_base_url("localhost:8080/api/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api");
        assert!(parse_base_url("http://").is_err());
    }
}
