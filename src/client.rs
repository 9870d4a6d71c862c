use std::sync::Arc;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::{
    api::{decode, ApiError, ApiResult},
    config::ClientConfig,
    errors::AppError,
    session::{ClearOptions, LogNavigator, Navigator, SessionManager},
    storage::{FileStorage, LocalStorage},
    stores::Store,
    structs::{AuthRes, Item, Order},
    utils::{endpoint_url, split_endpoint},
};

#[derive(Debug, Clone)]
struct PendingRequest {
    method: Method,
    segments: Vec<String>,
    body: Option<Value>,
    retried: bool,
}

/// REST client that refreshes an expired token once per request and replays it.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<SessionManager>,
    items: Store<Vec<Item>>,
    orders: Store<Vec<Order>>,
}

impl ApiClient {
    pub fn new(base_url: Url, session: Arc<SessionManager>) -> Result<Self, AppError> {
        if base_url.cannot_be_a_base() {
            return Err(AppError::UrlError(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            base_url,
            session,
            items: Store::default(),
            orders: Store::default(),
        })
    }

    /// File-backed client that picks up the session left by a previous run.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::open(&config.storage_path)?);
        let navigator: Arc<dyn Navigator> = Arc::new(LogNavigator);
        let session =
            SessionManager::new(storage, navigator).with_login_path(config.login_path.clone());
        session.restore();
        Self::new(config.api_url.clone(), Arc::new(session))
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn items(&self) -> &Store<Vec<Item>> {
        &self.items
    }

    pub fn orders(&self) -> &Store<Vec<Order>> {
        &self.orders
    }

    /// `endpoint` is a plain, unencoded path such as `/api/get_items`. Each
    /// segment is percent-encoded here; query strings and fragments are rejected.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        if endpoint.contains(['?', '#']) {
            let message = format!("endpoint must be a plain path: {endpoint}");
            return ApiResult::err(None, ApiError::Unknown(message));
        }
        self.execute(PendingRequest {
            method,
            segments: split_endpoint(endpoint),
            body,
            retried: false,
        })
        .await
    }

    pub(crate) async fn call<B, T>(
        &self,
        method: Method,
        segments: Vec<String>,
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = match body.map(serde_json::to_value).transpose() {
            Ok(body) => body,
            Err(e) => return ApiResult::err(None, ApiError::Unknown(e.to_string())),
        };
        self.execute(PendingRequest {
            method,
            segments,
            body,
            retried: false,
        })
        .await
    }

    /// Trades the session's email for a fresh `{user, token}` pair.
    ///
    /// Never retried itself. Any failure leaves the client signed out.
    pub async fn refresh(&self) -> ApiResult<AuthRes> {
        let Some(email) = self.session.email() else {
            log::warn!("Token refresh requested with no user in session");
            self.expire_session();
            return ApiResult::err(
                None,
                ApiError::Unauthorized("No user available to refresh the session".to_owned()),
            );
        };

        let mut segments = split_endpoint("/api/auth/refresh");
        segments.push(email);
        let result: ApiResult<AuthRes> = self
            .send(&PendingRequest {
                method: Method::GET,
                segments,
                body: None,
                retried: true,
            })
            .await;

        match &result.outcome {
            Ok(auth) => self.install(auth),
            Err(e) => {
                log::warn!("Token refresh failed: {}", e);
                self.expire_session();
            }
        }
        result
    }

    async fn execute<T: DeserializeOwned>(&self, mut pending: PendingRequest) -> ApiResult<T> {
        let first = self.send(&pending).await;
        if !first.is_unauthorized() {
            return first;
        }
        if pending.retried {
            self.expire_session();
            return first;
        }

        let refreshed = self.refresh().await;
        if let Err(e) = refreshed.outcome {
            let status = refreshed.status.or(first.status);
            return ApiResult::err(status, ApiError::Unauthorized(e.to_string()));
        }

        pending.retried = true;
        let replayed = self.send(&pending).await;
        if replayed.is_unauthorized() {
            log::warn!("Request still unauthorized after token refresh");
            self.expire_session();
        }
        replayed
    }

    async fn send<T: DeserializeOwned>(&self, pending: &PendingRequest) -> ApiResult<T> {
        let Some(url) = endpoint_url(&self.base_url, &pending.segments) else {
            let message = format!("cannot build URL from {}", self.base_url);
            return ApiResult::err(None, ApiError::Unknown(message));
        };
        log::debug!(
            "{} {}{}",
            pending.method,
            url.path(),
            if pending.retried { " (retry)" } else { "" }
        );

        let mut builder = self.http.request(pending.method.clone(), url);
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &pending.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Request to {} failed: {}", pending.segments.join("/"), e);
                return ApiResult::err(None, ApiError::Transport(e.to_string()));
            }
        };
        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => decode(status, &body),
            Err(e) => ApiResult::err(Some(status), ApiError::Transport(e.to_string())),
        }
    }

    pub(crate) fn install(&self, auth: &AuthRes) {
        if let Err(e) = self.session.set_session(auth.user.clone(), auth.token.clone()) {
            log::error!("Failed to persist session: {}", e);
        }
    }

    fn expire_session(&self) {
        let options = ClearOptions {
            path: self.session.login_path().to_owned(),
            ..ClearOptions::default()
        };
        if let Err(e) = self.session.clear_session(options) {
            log::error!("Failed to clear stored session: {}", e);
        }
    }
}
