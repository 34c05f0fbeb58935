//! Request execution shared by the client and every entity
//!
//! One [`Dispatcher`] exists per client. It waits on the rate gate, builds
//! the URL (query from the filter plus credentials), sends the request,
//! records the rate limit headers and then either hands back the JSON body
//! or classifies the failure.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::{debug, warn};
use url::Url;

use super::classify::classify_response;
use super::rate_gate::{RateGate, RateLimitStatus};
use crate::core::{ClientConfig, Credentials, ModioError, Result, ValidationError};
use crate::filter::{Filter, FilterSchema};
use crate::objects::{map_collection, map_entity, Entity, Returned};

/// A request before credentials and the base URL are applied
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    filter: Option<Filter>,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    api_key_only: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            filter: None,
            query: Vec::new(),
            form: Vec::new(),
            api_key_only: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Attach `filter` after checking it was built for `schema`
    pub fn filter_for(self, filter: Option<Filter>, schema: &'static FilterSchema) -> Result<Self> {
        if let Some(filter) = &filter {
            if filter.schema().resource != schema.resource {
                return Err(ValidationError::InvalidArgument {
                    argument: "filter".to_string(),
                    reason: format!(
                        "filter was built for {} but this endpoint lists {}",
                        filter.schema().resource,
                        schema.resource
                    ),
                }
                .into());
            }
        }
        Ok(self.filter(filter))
    }

    /// Authenticate with the api key even when a token is configured
    pub fn api_key_only(mut self) -> Self {
        self.api_key_only = true;
        self
    }

    /// Extra query parameter outside of the filter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Form-encoded body field
    pub fn form(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.form.push((key.into(), value.to_string()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Successful response body
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Json(Value),
    /// 204 or an empty body
    Empty,
}

/// Sends requests for one client
pub struct Dispatcher {
    http: reqwest::Client,
    config: ClientConfig,
    api_root: String,
    credentials: RwLock<Credentials>,
    rate_gate: RateGate,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("api_root", &self.api_root)
            .field("lang", &self.config.lang)
            .field("rate_limit", &self.rate_gate.status())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let api_root = config.api_root();
        Url::parse(&api_root).map_err(|source| ModioError::invalid_url(api_root.as_str(), source))?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModioError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                field: None,
                suggestion: None,
            })?;

        Ok(Self {
            http,
            config,
            api_root,
            credentials: RwLock::new(credentials),
            rate_gate: RateGate::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rate_limit_status(&self) -> RateLimitStatus {
        self.rate_gate.status()
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the credentials used by later requests
    pub fn set_credentials(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    fn build_url(&self, request: &ApiRequest, credentials: &Credentials) -> Result<Url> {
        let raw = format!("{}{}", self.api_root, request.path);
        let mut url = Url::parse(&raw).map_err(|source| ModioError::invalid_url(raw.as_str(), source))?;

        let mut pairs: Vec<(String, String)> = request
            .filter
            .as_ref()
            .map(|filter| filter.encode().pairs().to_vec())
            .unwrap_or_default();
        pairs.extend(request.query.iter().cloned());

        if request.api_key_only || credentials.token().is_none() {
            let key = credentials.api_key().ok_or_else(|| ModioError::Configuration {
                message: format!("{} requires an api key", request.path),
                field: Some("api_key".to_string()),
                suggestion: Some("Configure the client with an api key as well as the token".to_string()),
            })?;
            pairs.push(("api_key".to_string(), key.to_string()));
        }

        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Send one request and return its body
    ///
    /// The rate gate is updated from the response headers whether the call
    /// succeeded or not.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<Response> {
        self.rate_gate.wait_until_available().await;

        let credentials = self.credentials();
        let url = self.build_url(&request, &credentials)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, self.config.lang.as_str());
        if let Some(token) = credentials.token().filter(|_| !request.api_key_only) {
            builder = builder.bearer_auth(token);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        debug!("mod.io request: {} {}", request.method, request.path);
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        debug!("mod.io response: {} for {} {}", status, request.method, request.path);

        self.rate_gate.update(status, &headers);

        let body = response.bytes().await?;

        if !status.is_success() {
            let error = classify_response(status, &headers, &body);
            warn!("mod.io {} {} failed: {}", request.method, request.path, error);
            return Err(error);
        }

        if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Response::Empty);
        }

        let value = serde_json::from_slice(&body).map_err(|source| ModioError::MalformedResponse {
            entity: "response body",
            source,
        })?;
        Ok(Response::Json(value))
    }

    /// Send a request whose body is a single `T`
    pub async fn fetch_one<T: Entity>(self: &Arc<Self>, request: ApiRequest) -> Result<T> {
        match self.dispatch(request).await? {
            Response::Json(value) => map_entity(value, &ClientHandle::new(self)),
            Response::Empty => Err(empty_body(T::NAME)),
        }
    }

    /// Send a request whose body is a page of `T`
    pub async fn fetch_many<T: Entity>(self: &Arc<Self>, request: ApiRequest) -> Result<Returned<T>> {
        match self.dispatch(request).await? {
            Response::Json(value) => map_collection(value, &ClientHandle::new(self)),
            Response::Empty => Err(empty_body(T::NAME)),
        }
    }

    /// Send a request whose body, if any, is ignored
    pub async fn fetch_empty(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(request).await.map(|_| ())
    }
}

fn empty_body(entity: &'static str) -> ModioError {
    use serde::de::Error as _;
    ModioError::MalformedResponse {
        entity,
        source: serde_json::Error::custom("expected a JSON body, got an empty response"),
    }
}

/// Non-owning link from an entity back to the client that fetched it
///
/// Entities outliving their client keep their data but their calls fail
/// with [`ModioError::Unsupported`].
#[derive(Clone, Default)]
pub struct ClientHandle(Weak<Dispatcher>);

impl ClientHandle {
    pub(crate) fn new(dispatcher: &Arc<Dispatcher>) -> Self {
        Self(Arc::downgrade(dispatcher))
    }

    pub fn is_attached(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub(crate) fn dispatcher(&self) -> Result<Arc<Dispatcher>> {
        self.0.upgrade().ok_or_else(|| ModioError::Unsupported {
            message: "entity is not attached to a live client".to_string(),
        })
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}
