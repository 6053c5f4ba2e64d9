use super::errors::ConnectorError;
use crate::configuration::NewsApiSettings;
use actix_web::web;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Parameters of the provider's `everything` search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EverythingQuery {
    pub q: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort_by: Option<String>,
}

/// Parameters of the provider's `top-headlines` listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlinesQuery {
    pub country: Option<String>,
    pub sources: Option<String>,
}

impl EverythingQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.clone())];
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if let Some(from) = non_blank(&self.from) {
            params.push(("from", from));
        }
        if let Some(to) = non_blank(&self.to) {
            params.push(("to", to));
        }
        if let Some(sort_by) = non_blank(&self.sort_by) {
            params.push(("sortBy", sort_by));
        }
        params
    }
}

impl HeadlinesQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![];
        if let Some(country) = non_blank(&self.country) {
            params.push(("country", country));
        }
        if let Some(sources) = non_blank(&self.sources) {
            params.push(("sources", sources));
        }
        params
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Full-text article search. The provider payload is returned untouched.
    async fn everything(&self, query: &EverythingQuery) -> Result<Value, ConnectorError>;
    /// Top headlines by country and/or source. The provider payload is returned untouched.
    async fn top_headlines(&self, query: &HeadlinesQuery) -> Result<Value, ConnectorError>;
}

pub struct NewsApiClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    user_agent: String,
}

impl NewsApiClient {
    pub fn new(settings: &NewsApiSettings) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))?;

        if settings.api_key.trim().is_empty() {
            tracing::warn!("News provider API key is empty, upstream calls will be rejected");
        }

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            http_client,
            user_agent: format!("newsdesk/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    async fn send_request(
        &self,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<Value, ConnectorError> {
        let span = tracing::info_span!("news_provider_request", path);

        let resp = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .header("User-Agent", &self.user_agent)
            .header("X-Api-Key", &self.api_key)
            .query(&query)
            .send()
            .instrument(span)
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "News provider returned an error");
            return Err(ConnectorError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str::<Value>(&text).map_err(|_| ConnectorError::InvalidResponse(text))
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn everything(&self, query: &EverythingQuery) -> Result<Value, ConnectorError> {
        self.send_request("/v2/everything", query.to_params()).await
    }

    async fn top_headlines(&self, query: &HeadlinesQuery) -> Result<Value, ConnectorError> {
        self.send_request("/v2/top-headlines", query.to_params()).await
    }
}

/// Initialize the news provider connector from app settings
pub fn init(settings: &NewsApiSettings) -> Result<web::Data<Arc<dyn NewsProvider>>, ConnectorError> {
    let client = NewsApiClient::new(settings)?;
    tracing::info!("News provider connector initialized ({})", settings.base_url);
    let connector: Arc<dyn NewsProvider> = Arc::new(client);
    Ok(web::Data::new(connector))
}

pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// How the mock answers every call.
    pub enum MockBehavior {
        Respond(Value),
        Unreachable,
        UpstreamStatus(u16),
        Garbage,
    }

    /// In-memory provider recording the queries it receives.
    pub struct MockNewsProvider {
        behavior: MockBehavior,
        pub everything_calls: Mutex<Vec<EverythingQuery>>,
        pub headlines_calls: Mutex<Vec<HeadlinesQuery>>,
    }

    impl MockNewsProvider {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                everything_calls: Mutex::new(vec![]),
                headlines_calls: Mutex::new(vec![]),
            }
        }

        pub fn respond(payload: Value) -> Self {
            Self::new(MockBehavior::Respond(payload))
        }

        fn answer(&self) -> Result<Value, ConnectorError> {
            match &self.behavior {
                MockBehavior::Respond(payload) => Ok(payload.clone()),
                MockBehavior::Unreachable => Err(ConnectorError::Transport(
                    "Connection failed: mock provider is down".to_string(),
                )),
                MockBehavior::UpstreamStatus(status) => Err(ConnectorError::Upstream {
                    status: *status,
                    body: r#"{"status":"error"}"#.to_string(),
                }),
                MockBehavior::Garbage => {
                    Err(ConnectorError::InvalidResponse("<html>".to_string()))
                }
            }
        }
    }

    impl Default for MockNewsProvider {
        fn default() -> Self {
            Self::respond(serde_json::json!({
                "status": "ok",
                "totalResults": 0,
                "articles": []
            }))
        }
    }

    #[async_trait]
    impl NewsProvider for MockNewsProvider {
        async fn everything(&self, query: &EverythingQuery) -> Result<Value, ConnectorError> {
            if let Ok(mut calls) = self.everything_calls.lock() {
                calls.push(query.clone());
            }
            self.answer()
        }

        async fn top_headlines(&self, query: &HeadlinesQuery) -> Result<Value, ConnectorError> {
            if let Ok(mut calls) = self.headlines_calls.lock() {
                calls.push(query.clone());
            }
            self.answer()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str) -> NewsApiSettings {
        NewsApiSettings {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            timeout_secs: 2,
            latest_query: "technology".to_string(),
        }
    }

    #[tokio::test]
    async fn everything_relays_provider_payload() {
        let server = MockServer::start().await;
        let payload = json!({"status": "ok", "totalResults": 1, "articles": [{"title": "Rust 2.0"}]});

        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(header("X-Api-Key", "test-key"))
            .and(query_param("q", "rust"))
            .and(query_param("pageSize", "5"))
            .and(query_param("from", "2025-04-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsApiClient::new(&settings(&server.uri())).unwrap();
        let query = EverythingQuery {
            q: "rust".to_string(),
            page_size: Some(5),
            from: Some("2025-04-01".to_string()),
            to: Some("  ".to_string()),
            ..Default::default()
        };

        assert_eq!(client.everything(&query).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn top_headlines_forwards_country_and_sources() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("country", "us"))
            .and(query_param("sources", "bbc-news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsApiClient::new(&settings(&server.uri())).unwrap();
        let query = HeadlinesQuery {
            country: Some("us".to_string()),
            sources: Some("bbc-news".to_string()),
        };

        assert_eq!(
            client.top_headlines(&query).await.unwrap()["status"],
            "ok"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"status": "error", "code": "apiKeyInvalid"})),
            )
            .mount(&server)
            .await;

        let client = NewsApiClient::new(&settings(&server.uri())).unwrap();
        let err = client
            .top_headlines(&HeadlinesQuery {
                country: Some("us".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            ConnectorError::Upstream { status, ref body } => {
                assert_eq!(status, 401);
                assert!(body.contains("apiKeyInvalid"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn non_json_body_is_unexpected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = NewsApiClient::new(&settings(&server.uri())).unwrap();
        let err = client
            .everything(&EverythingQuery {
                q: "rust".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectorError::InvalidResponse(_)));
        assert!(!err.is_fetch_failure());
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_failure() {
        // Nothing listens on port 9 of localhost
        let client = NewsApiClient::new(&settings("http://127.0.0.1:9")).unwrap();
        let err = client
            .everything(&EverythingQuery {
                q: "rust".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectorError::Transport(_)));
        assert!(err.is_fetch_failure());
    }
}
