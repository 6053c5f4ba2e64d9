use super::provider_error;
use crate::connectors::{EverythingQuery, NewsProvider};
use crate::forms::SearchQuery;
use crate::helpers::JsonResponse;
use actix_web::{get, web, Responder, Result};
use std::sync::Arc;

#[tracing::instrument(name = "Search news.", skip(provider))]
#[get("/")]
pub async fn search_handler(
    query: web::Query<SearchQuery>,
    provider: web::Data<Arc<dyn NewsProvider>>,
) -> Result<impl Responder> {
    let query: EverythingQuery = query.into_inner().into();

    provider
        .everything(&query)
        .await
        .map(|payload| {
            JsonResponse::build()
                .set_code("NEWS_FETCHED")
                .set_data(payload)
                .ok("News articles fetched successfully")
        })
        .map_err(|err| provider_error(err, "NEWS_FETCH_FAILED"))
}
