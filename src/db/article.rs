use crate::models;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::Instrument;

/// Which of `urls` are already stored
pub async fn existing_urls(pool: &PgPool, urls: &[String]) -> Result<HashSet<String>, String> {
    if urls.is_empty() {
        return Ok(HashSet::new());
    }

    let query_span = tracing::info_span!("Looking up already saved article urls");
    sqlx::query_scalar::<_, String>(r#"SELECT url FROM news WHERE url = ANY($1)"#)
        .bind(urls)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map(|rows| rows.into_iter().collect())
        .map_err(|err| {
            tracing::error!("Failed to execute fetch query: {:?}", err);
            "Failed to look up saved articles".to_string()
        })
}

/// Insert the whole batch in one transaction, nothing is stored if any row fails.
#[tracing::instrument(name = "Save articles", skip(pool, articles), fields(count = articles.len()))]
pub async fn insert_batch(
    pool: &PgPool,
    articles: Vec<models::NewArticle>,
) -> Result<Vec<models::Article>, String> {
    let mut tx = pool.begin().await.map_err(|err| {
        tracing::error!("Failed to start transaction: {:?}", err);
        format!("Failed to start transaction: {}", err)
    })?;

    let mut saved = Vec::with_capacity(articles.len());
    for article in articles {
        let result = sqlx::query_as::<_, models::Article>(
            r#"
            INSERT INTO news (title, description, url, published_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, url, published_at
            "#,
        )
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.url)
        .bind(article.published_at)
        .fetch_one(&mut *tx)
        .await;

        match result {
            Ok(row) => saved.push(row),
            Err(err) => {
                tracing::error!("Failed to insert article {}: {:?}", article.url, err);
                if let Err(err) = tx.rollback().await {
                    tracing::error!("Failed to roll back transaction: {:?}", err);
                }
                return Err("Failed to insert".to_string());
            }
        }
    }

    tx.commit().await.map_err(|err| {
        tracing::error!("Failed to commit transaction: {:?}", err);
        format!("Failed to commit transaction: {}", err)
    })?;

    Ok(saved)
}

pub async fn count(pool: &PgPool) -> Result<i64, String> {
    let query_span = tracing::info_span!("Counting saved articles");
    sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM news"#)
        .fetch_one(pool)
        .instrument(query_span)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute count query: {:?}", err);
            "Failed to count articles".to_string()
        })
}

/// Newest first; articles without a publish date go last.
pub async fn fetch_page(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<models::Article>, String> {
    let query_span = tracing::info_span!("Fetching a page of saved articles", limit, offset);
    sqlx::query_as::<_, models::Article>(
        r#"
        SELECT id, title, description, url, published_at
        FROM news
        ORDER BY published_at DESC NULLS LAST, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute fetch query: {:?}", err);
        "Failed to fetch articles".to_string()
    })
}
