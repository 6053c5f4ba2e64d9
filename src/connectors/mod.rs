//! External service connectors
//!
//! The news provider is reached only through the [`NewsProvider`] trait so that
//! routes never depend on HTTP details and tests can swap in
//! [`news_api::mock::MockNewsProvider`].

pub mod errors;
pub mod news_api;

pub use errors::ConnectorError;
pub use news_api::init as init_news_provider;
pub use news_api::{EverythingQuery, HeadlinesQuery, NewsApiClient, NewsProvider};
