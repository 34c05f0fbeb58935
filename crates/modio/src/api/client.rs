//! Entry point of the library
//!
//! [`Client`] is cheap to clone; clones share the dispatcher and therefore
//! the credentials and the rate limit state.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::dispatcher::{ApiRequest, Dispatcher};
use super::rate_gate::RateLimitStatus;
use crate::core::{ClientConfig, Credentials, ModioError, Result, ValidationError};
use crate::filter::{fields, Filter};
use crate::objects::{
    AccessToken, ClientHandle, Event, Game, Message, Mod, ModFile, Rating, Returned, User,
};

const API_KEY_VAR: &str = "MODIO_API_KEY";
const ACCESS_TOKEN_VAR: &str = "MODIO_ACCESS_TOKEN";
const LANG_VAR: &str = "MODIO_LANG";
const TEST_ENV_VAR: &str = "MODIO_TEST_ENV";
const BASE_URL_VAR: &str = "MODIO_BASE_URL";

/// Builder for [`Client`]
#[derive(Clone, Default)]
pub struct ClientBuilder {
    api_key: Option<String>,
    token: Option<String>,
    config: ClientConfig,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("has_api_key", &self.api_key.is_some())
            .field("has_token", &self.token.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl ClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// OAuth 2 access token; takes precedence over the api key for most calls
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Send requests to `url` instead of the mod.io hosts
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.config.lang = lang.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn test_env(mut self, test_env: bool) -> Self {
        self.config.test_env = test_env;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    fn credentials(&self) -> Result<Credentials> {
        let api_key = self.api_key.clone().filter(|k| !k.trim().is_empty());
        let token = self.token.clone().filter(|t| !t.trim().is_empty());

        match (api_key, token) {
            (api_key, Some(token)) => Ok(Credentials::Token { token, api_key }),
            (Some(api_key), None) => Ok(Credentials::ApiKey(api_key)),
            (None, None) => Err(ModioError::Configuration {
                message: "Neither an api key nor an access token was provided".to_string(),
                field: Some("api_key".to_string()),
                suggestion: Some(
                    "Generate an api key at https://mod.io/me/access or pass an OAuth access token"
                        .to_string(),
                ),
            }),
        }
    }

    pub fn build(self) -> Result<Client> {
        let credentials = self.credentials()?;
        let dispatcher = Dispatcher::new(credentials, self.config)?;
        Ok(Client {
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Builder populated from `lookup`, which maps variable names to values
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ClientBuilder::default();

        if let Some(key) = lookup(API_KEY_VAR) {
            builder = builder.api_key(key);
        }
        if let Some(token) = lookup(ACCESS_TOKEN_VAR) {
            builder = builder.token(token);
        }
        if builder.api_key.is_none() && builder.token.is_none() {
            return Err(ModioError::Configuration {
                message: format!("{} environment variable not set", API_KEY_VAR),
                field: Some(API_KEY_VAR.to_string()),
                suggestion: Some(format!(
                    "Set {} (or {}) in your .env file",
                    API_KEY_VAR, ACCESS_TOKEN_VAR
                )),
            });
        }

        if let Some(lang) = lookup(LANG_VAR) {
            builder = builder.lang(lang);
        }
        if let Some(url) = lookup(BASE_URL_VAR) {
            builder = builder.base_url(url);
        }
        if let Some(flag) = lookup(TEST_ENV_VAR) {
            let test_env = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(ModioError::Configuration {
                        message: format!("{} has invalid value '{}'", TEST_ENV_VAR, other),
                        field: Some(TEST_ENV_VAR.to_string()),
                        suggestion: Some("Use true or false".to_string()),
                    })
                }
            };
            builder = builder.test_env(test_env);
        }

        Ok(builder)
    }
}

/// Client for the mod.io API
#[derive(Debug, Clone)]
pub struct Client {
    dispatcher: Arc<Dispatcher>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Read-only client authenticated with an api key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client from `MODIO_*` environment variables, loading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Ignore error if .env not present
        ClientBuilder::from_lookup(|name| std::env::var(name).ok())?.build()
    }

    /// Handle entities use to call back into this client
    pub fn handle(&self) -> ClientHandle {
        ClientHandle::new(&self.dispatcher)
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    /// Get current rate limit information
    pub fn rate_limit_status(&self) -> RateLimitStatus {
        self.dispatcher.rate_limit_status()
    }

    pub async fn get_game(&self, game_id: u32) -> Result<Game> {
        self.dispatcher
            .fetch_one(ApiRequest::get(format!("/games/{}", game_id)))
            .await
    }

    pub async fn get_games(&self, filter: Option<Filter>) -> Result<Returned<Game>> {
        let request = ApiRequest::get("/games").filter_for(filter, &fields::GAMES)?;
        self.dispatcher.fetch_many(request).await
    }

    /// Fetch a mod directly, without first loading its game
    pub async fn get_game_mod(&self, game_id: u32, mod_id: u32) -> Result<Mod> {
        self.dispatcher
            .fetch_one(ApiRequest::get(format!("/games/{}/mods/{}", game_id, mod_id)))
            .await
    }

    pub async fn get_user(&self, user_id: u32) -> Result<User> {
        self.dispatcher
            .fetch_one(ApiRequest::get(format!("/users/{}", user_id)))
            .await
    }

    pub async fn get_users(&self, filter: Option<Filter>) -> Result<Returned<User>> {
        let request = ApiRequest::get("/users").filter_for(filter, &fields::USERS)?;
        self.dispatcher.fetch_many(request).await
    }

    /// The authenticated user
    pub async fn get_my_user(&self) -> Result<User> {
        self.dispatcher.fetch_one(ApiRequest::get("/me")).await
    }

    /// Mods the authenticated user is subscribed to
    pub async fn get_my_subs(&self, filter: Option<Filter>) -> Result<Returned<Mod>> {
        let request = ApiRequest::get("/me/subscribed").filter_for(filter, &fields::MODS)?;
        self.dispatcher.fetch_many(request).await
    }

    pub async fn get_my_events(&self, filter: Option<Filter>) -> Result<Returned<Event>> {
        let request = ApiRequest::get("/me/events").filter_for(filter, &fields::USER_EVENTS)?;
        self.dispatcher.fetch_many(request).await
    }

    /// Games the authenticated user is a team member of
    pub async fn get_my_games(&self, filter: Option<Filter>) -> Result<Returned<Game>> {
        let request = ApiRequest::get("/me/games").filter_for(filter, &fields::GAMES)?;
        self.dispatcher.fetch_many(request).await
    }

    pub async fn get_my_mods(&self, filter: Option<Filter>) -> Result<Returned<Mod>> {
        let request = ApiRequest::get("/me/mods").filter_for(filter, &fields::MODS)?;
        self.dispatcher.fetch_many(request).await
    }

    /// Files uploaded by the authenticated user
    ///
    /// These carry no game id, so [`ModFile::edit`] and [`ModFile::delete`]
    /// are unavailable on them.
    pub async fn get_my_modfiles(&self, filter: Option<Filter>) -> Result<Returned<ModFile>> {
        let request = ApiRequest::get("/me/files").filter_for(filter, &fields::FILES)?;
        self.dispatcher.fetch_many(request).await
    }

    pub async fn get_my_ratings(&self, filter: Option<Filter>) -> Result<Returned<Rating>> {
        let request = ApiRequest::get("/me/ratings").filter_for(filter, &fields::RATINGS)?;
        self.dispatcher.fetch_many(request).await
    }

    /// Users muted by the authenticated user
    pub async fn get_my_mutes(&self, filter: Option<Filter>) -> Result<Returned<User>> {
        let request = ApiRequest::get("/me/users/muted").filter_for(filter, &fields::USERS)?;
        self.dispatcher.fetch_many(request).await
    }

    /// Ask mod.io to email a 5 character security code to `email`
    pub async fn email_request(&self, email: &str) -> Result<Message> {
        if !email.contains('@') {
            return Err(ValidationError::InvalidArgument {
                argument: "email".to_string(),
                reason: format!("'{}' is not an email address", email),
            }
            .into());
        }

        let request = ApiRequest::post("/oauth/emailrequest")
            .api_key_only()
            .form("email", email);
        self.dispatcher.fetch_one(request).await
    }

    /// Exchange the emailed security code for an access token
    ///
    /// On success the token is used for every later request of this client
    /// and its clones.
    pub async fn email_exchange(&self, code: &str) -> Result<AccessToken> {
        let code = code.trim();
        if code.chars().count() != 5 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidArgument {
                argument: "code".to_string(),
                reason: "security code must be 5 characters".to_string(),
            }
            .into());
        }

        let request = ApiRequest::post("/oauth/emailexchange")
            .api_key_only()
            .form("security_code", code);
        let token: AccessToken = self.dispatcher.fetch_one(request).await?;

        let api_key = self.dispatcher.credentials().api_key().map(str::to_string);
        self.dispatcher.set_credentials(Credentials::Token {
            token: token.access_token.clone(),
            api_key,
        });
        info!("Exchanged security code for an access token");

        Ok(token)
    }
}
