use newsdesk::configuration::{get_configuration, DatabaseSettings, Settings};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub settings: Settings,
    /// Stands in for the news provider
    pub provider: MockServer,
}

impl TestApp {
    pub async fn token(&self) -> String {
        let body: serde_json::Value = reqwest::Client::new()
            .post(format!("{}/token", self.address))
            .json(&serde_json::json!({
                "client_id": self.settings.auth.client_id,
                "client_secret": self.settings.auth.client_secret,
            }))
            .send()
            .await
            .expect("Failed to request token")
            .json()
            .await
            .expect("Token response should be JSON");

        body["data"]["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }
}

/// Spawn the server on a random port against a fresh database and a mock provider.
/// Returns `None` when Postgres is not reachable so the suite can run without it.
pub async fn spawn_app() -> Option<TestApp> {
    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let provider = MockServer::start().await;
    configuration.news_api.base_url = provider.uri();
    configuration.news_api.api_key = "test-key".to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = newsdesk::startup::run(listener, connection_pool.clone(), configuration.clone())
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        settings: configuration,
        provider,
    })
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    Ok(connection_pool)
}
