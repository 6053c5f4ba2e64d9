use super::provider_error;
use crate::connectors::{HeadlinesQuery, NewsProvider};
use crate::forms::HeadlinesFilter;
use crate::helpers::JsonResponse;
use actix_web::{get, web, HttpResponse, Result};
use std::sync::Arc;

async fn fetch_headlines(
    provider: &dyn NewsProvider,
    query: HeadlinesQuery,
) -> Result<HttpResponse> {
    let message = HeadlinesFilter::describe(&query);

    provider
        .top_headlines(&query)
        .await
        .map(|payload| {
            JsonResponse::build()
                .set_code("TOP_HEADLINES_FETCHED")
                .set_data(payload)
                .ok(message)
        })
        .map_err(|err| provider_error(err, "HEADLINES_FETCH_FAILED"))
}

#[tracing::instrument(name = "Top headlines by country.", skip(provider))]
#[get("/headlines/country/{code}")]
pub async fn by_country_handler(
    path: web::Path<String>,
    provider: web::Data<Arc<dyn NewsProvider>>,
) -> Result<HttpResponse> {
    let query = HeadlinesQuery {
        country: Some(path.into_inner()),
        sources: None,
    };
    fetch_headlines(provider.get_ref().as_ref(), query).await
}

#[tracing::instrument(name = "Top headlines by source.", skip(provider))]
#[get("/headlines/source/{id}")]
pub async fn by_source_handler(
    path: web::Path<String>,
    provider: web::Data<Arc<dyn NewsProvider>>,
) -> Result<HttpResponse> {
    let query = HeadlinesQuery {
        country: None,
        sources: Some(path.into_inner()),
    };
    fetch_headlines(provider.get_ref().as_ref(), query).await
}

#[tracing::instrument(name = "Top headlines by filter.", skip(provider))]
#[get("/headlines/filter")]
pub async fn filter_handler(
    filter: web::Query<HeadlinesFilter>,
    provider: web::Data<Arc<dyn NewsProvider>>,
) -> Result<HttpResponse> {
    let query = filter.into_inner().into_query().ok_or_else(|| {
        JsonResponse::<()>::build()
            .set_code("MISSING_FILTER")
            .bad_request("Either source or country is required")
    })?;
    fetch_headlines(provider.get_ref().as_ref(), query).await
}
