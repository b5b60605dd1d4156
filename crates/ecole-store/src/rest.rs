//! HTTP implementation of the RowStore trait for a PostgREST-style service.
//!
//! Tables live under `<base>/rest/v1/<table>`. Every request carries the
//! service key both as `apikey` and as a bearer token.

use async_trait::async_trait;
use ecole_core::{EntitySchema, OrderBy, RecordId, Row};
use reqwest::{Client, Method, RequestBuilder, Response};

use crate::error::{Result, StoreError};
use crate::remote::RowStore;

/// REST row store client.
#[derive(Clone)]
pub struct RestRowStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for RestRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestRowStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestRowStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Use an existing HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// The `order` query parameter for a schema ordering.
fn order_param(order: OrderBy) -> String {
    match order {
        OrderBy::Newest => "created_at.desc".to_string(),
        OrderBy::Ascending(column) => format!("{}.asc", column),
        OrderBy::Descending(column) => format!("{}.desc", column),
    }
}

fn id_filter(id: &RecordId) -> String {
    format!("eq.{}", id)
}

/// Turn a non-success response into [`StoreError::Backend`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Backend {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RowStore for RestRowStore {
    async fn select(&self, schema: &'static EntitySchema) -> Result<Vec<Row>> {
        let order = order_param(schema.order);
        let response = self
            .request(Method::GET, schema.table)
            .query(&[("select", "*"), ("order", order.as_str())])
            .send()
            .await?;
        let rows = check(response).await?.json::<Vec<Row>>().await?;
        Ok(rows)
    }

    async fn insert(&self, schema: &'static EntitySchema, row: Row) -> Result<()> {
        let response = self
            .request(Method::POST, schema.table)
            .json(&row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update(&self, schema: &'static EntitySchema, id: &RecordId, row: Row) -> Result<()> {
        let response = self
            .request(Method::PATCH, schema.table)
            .query(&[("id", id_filter(id))])
            .json(&row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, schema: &'static EntitySchema, id: &RecordId) -> Result<()> {
        let response = self
            .request(Method::DELETE, schema.table)
            .query(&[("id", id_filter(id))])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn exists_any(&self, schema: &'static EntitySchema) -> Result<bool> {
        let response = self
            .request(Method::GET, schema.table)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        let rows = check(response).await?.json::<Vec<Row>>().await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecole_core::EntityKind;

    #[test]
    fn test_urls() {
        let store = RestRowStore::new("https://school.example.org/", "secret").unwrap();
        assert_eq!(store.base_url(), "https://school.example.org");
        assert_eq!(
            store.table_url("teacher_advances"),
            "https://school.example.org/rest/v1/teacher_advances"
        );
        assert!(!format!("{:?}", store).contains("secret"));
    }

    #[test]
    fn test_order_param() {
        assert_eq!(order_param(EntityKind::User.schema().order), "created_at.desc");
        assert_eq!(order_param(EntityKind::Subject.schema().order), "name.asc");
        assert_eq!(order_param(EntityKind::Grade.schema().order), "date.desc");
        assert_eq!(id_filter(&RecordId::new("42")), "eq.42");
    }

    #[test]
    fn test_request_headers() {
        let store = RestRowStore::new("http://localhost:54321", "k3y").unwrap();
        let request = store
            .request(Method::GET, "users")
            .build()
            .unwrap();
        assert_eq!(request.headers()["apikey"], "k3y");
        assert_eq!(request.headers()["authorization"], "Bearer k3y");
    }
}
