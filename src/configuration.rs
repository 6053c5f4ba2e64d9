use serde;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub app_port: u16,
    pub app_host: String,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub news_api: NewsApiSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

/// Credentials of the single client allowed to request tokens, and the key tokens are signed with.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub secret_key: String,
    #[serde(default = "AuthSettings::default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewsApiSettings {
    /// Provider base URL, e.g. https://newsapi.org
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "NewsApiSettings::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Search term used by `POST /news/save-latest`
    #[serde(default = "NewsApiSettings::default_latest_query")]
    pub latest_query: String,
}

impl AuthSettings {
    const fn default_token_ttl_minutes() -> i64 {
        30
    }

    fn apply_env(&mut self) {
        if let Ok(client_id) = std::env::var("CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Ok(client_secret) = std::env::var("CLIENT_SECRET") {
            self.client_secret = client_secret;
        }
        if let Ok(secret_key) = std::env::var("SECRET_KEY") {
            self.secret_key = secret_key;
        }
    }

    /// Tokens signed with an empty key can be forged by anyone
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.secret_key.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.secret_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl NewsApiSettings {
    const fn default_timeout_secs() -> u64 {
        10
    }

    fn default_latest_query() -> String {
        "technology".to_string()
    }

    fn apply_env(&mut self) {
        if let Some(api_key) = std::env::var("NEWS_API_KEY")
            .ok()
            .or_else(|| std::env::var("API_KEY").ok())
        {
            self.api_key = api_key;
        }
    }
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    dotenvy::dotenv().ok();

    // configuration.yaml is optional; APP__AUTH__CLIENT_ID style variables override it
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;

    config.auth.apply_env();
    config.news_api.apply_env();
    config.auth.validate()?;

    Ok(config)
}
