use crate::configuration::Settings;
use crate::connectors::{EverythingQuery, NewsProvider};
use crate::db;
use crate::forms::{PageQuery, Pagination};
use crate::helpers::JsonResponse;
use crate::models::ArticlePage;
use crate::services::latest::{self, SAVE_LATEST_LIMIT};
use actix_web::{get, post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

use super::provider_error;

fn db_error(err: String) -> actix_web::Error {
    tracing::error!("Database failure: {}", err);
    JsonResponse::<()>::build()
        .set_code("DB_ERROR")
        .internal_server_error("Database error occurred")
}

#[tracing::instrument(name = "Save latest news.", skip(provider, pg_pool, settings))]
#[post("/save-latest")]
pub async fn save_latest_handler(
    provider: web::Data<Arc<dyn NewsProvider>>,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    let query = EverythingQuery {
        q: settings.news_api.latest_query.clone(),
        page_size: Some(SAVE_LATEST_LIMIT as u32),
        sort_by: Some("publishedAt".to_string()),
        ..Default::default()
    };

    let payload = provider
        .everything(&query)
        .await
        .map_err(|err| provider_error(err, "NEWS_FETCH_FAILED"))?;

    let candidates = latest::parse_articles(&payload);
    let urls: Vec<String> = candidates.iter().map(|a| a.url.clone()).collect();
    let existing = db::article::existing_urls(pg_pool.get_ref(), &urls)
        .await
        .map_err(db_error)?;

    let fresh = latest::select_unsaved(candidates, &existing, SAVE_LATEST_LIMIT);
    tracing::info!(
        fetched = urls.len(),
        already_saved = existing.len(),
        new = fresh.len(),
        "Saving latest articles"
    );

    let saved = if fresh.is_empty() {
        vec![]
    } else {
        db::article::insert_batch(pg_pool.get_ref(), fresh)
            .await
            .map_err(db_error)?
    };

    Ok(JsonResponse::build()
        .set_code("NEWS_SAVED")
        .set_data(saved)
        .ok("Top 3 articles saved successfully"))
}

#[tracing::instrument(name = "List saved news.", skip(pg_pool))]
#[get("/all")]
pub async fn list_handler(
    query: web::Query<PageQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let pagination = Pagination::try_from(query.into_inner()).map_err(|msg| {
        JsonResponse::<()>::build()
            .set_code("INVALID_PAGINATION")
            .bad_request(msg)
    })?;

    let total = db::article::count(pg_pool.get_ref())
        .await
        .map_err(db_error)?;
    let articles = db::article::fetch_page(pg_pool.get_ref(), pagination.limit(), pagination.offset())
        .await
        .map_err(db_error)?;

    Ok(JsonResponse::build()
        .set_code("ALL_NEWS_FETCHED")
        .set_data(ArticlePage {
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            articles,
        })
        .ok("Fetched news articles successfully"))
}
