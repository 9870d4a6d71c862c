use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::{
    config::DbConfig,
    errors::{AppError, DatabaseError},
    schemas::CollectionSchema,
    utils::endpoint_url,
};

const SYSTEM_DB: &str = "_system";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub sparse: bool,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl IndexDefinition {
    pub fn unique_persistent(field: &str) -> Self {
        Self {
            kind: "persistent".to_owned(),
            unique: true,
            sparse: false,
            fields: vec![field.to_owned()],
        }
    }
}

/// Administrative surface of the document store used during bootstrap.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn databases(&self) -> Result<Vec<String>, AppError>;
    async fn create_database(&self, name: &str) -> Result<(), AppError>;
    async fn collections(&self, db: &str) -> Result<Vec<String>, AppError>;
    async fn create_collection(
        &self,
        db: &str,
        name: &str,
        schema: Option<&CollectionSchema>,
    ) -> Result<(), AppError>;
    async fn indexes(&self, db: &str, collection: &str) -> Result<Vec<IndexDefinition>, AppError>;
    async fn create_index(
        &self,
        db: &str,
        collection: &str,
        index: &IndexDefinition,
    ) -> Result<(), AppError>;
}

#[derive(Deserialize)]
struct ResultEnvelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionInfo {
    name: String,
}

#[derive(Deserialize)]
struct IndexList {
    indexes: Vec<IndexDefinition>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_num: i64,
    #[serde(default)]
    error_message: String,
}

/// ArangoDB over its HTTP API, authenticated with basic auth.
pub struct ArangoHttpStore {
    client: Client,
    url: Url,
    username: String,
    password: String,
}

impl ArangoHttpStore {
    pub fn new(config: &DbConfig) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn api(
        &self,
        method: Method,
        db: &str,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, AppError> {
        let segments = ["_db", db, "_api", resource].map(str::to_owned);
        let mut url = endpoint_url(&self.url, &segments)
            .ok_or(AppError::UrlError(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        log::debug!("{} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password)))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(database_error(status.as_u16(), &body).into());
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn database_error(code: u16, body: &[u8]) -> DatabaseError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => DatabaseError {
            code,
            error_num: err.error_num,
            message: err.error_message,
        },
        Err(_) => DatabaseError {
            code,
            error_num: 0,
            message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

#[async_trait]
impl DocumentStore for ArangoHttpStore {
    async fn databases(&self) -> Result<Vec<String>, AppError> {
        let request = self.api(Method::GET, SYSTEM_DB, "database", &[])?;
        let envelope: ResultEnvelope<Vec<String>> = self.fetch(request).await?;
        Ok(envelope.result)
    }

    async fn create_database(&self, name: &str) -> Result<(), AppError> {
        let request = self
            .api(Method::POST, SYSTEM_DB, "database", &[])?
            .json(&json!({ "name": name }));
        self.fetch::<Value>(request).await?;
        Ok(())
    }

    async fn collections(&self, db: &str) -> Result<Vec<String>, AppError> {
        let request = self.api(Method::GET, db, "collection", &[("excludeSystem", "true")])?;
        let envelope: ResultEnvelope<Vec<CollectionInfo>> = self.fetch(request).await?;
        Ok(envelope.result.into_iter().map(|c| c.name).collect())
    }

    async fn create_collection(
        &self,
        db: &str,
        name: &str,
        schema: Option<&CollectionSchema>,
    ) -> Result<(), AppError> {
        let mut body = json!({ "name": name });
        if let Some(schema) = schema {
            body["schema"] = serde_json::to_value(schema)?;
        }
        let request = self.api(Method::POST, db, "collection", &[])?.json(&body);
        self.fetch::<Value>(request).await?;
        Ok(())
    }

    async fn indexes(&self, db: &str, collection: &str) -> Result<Vec<IndexDefinition>, AppError> {
        let request = self.api(Method::GET, db, "index", &[("collection", collection)])?;
        let list: IndexList = self.fetch(request).await?;
        Ok(list.indexes)
    }

    async fn create_index(
        &self,
        db: &str,
        collection: &str,
        index: &IndexDefinition,
    ) -> Result<(), AppError> {
        let request = self
            .api(Method::POST, db, "index", &[("collection", collection)])?
            .json(index);
        self.fetch::<Value>(request).await?;
        Ok(())
    }
}
