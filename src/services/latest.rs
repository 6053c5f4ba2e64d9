use crate::models::{NewArticle, TITLE_MAX_CHARS, URL_MAX_CHARS};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

/// Articles stored by one `save-latest` call at most.
pub const SAVE_LATEST_LIMIT: usize = 3;

/// Turn a provider `everything` payload into storable articles.
///
/// Entries without a title or url, or with a url longer than the column allows,
/// are dropped. Titles are cut to the column size.
pub fn parse_articles(payload: &Value) -> Vec<NewArticle> {
    payload
        .get("articles")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_article).collect())
        .unwrap_or_default()
}

fn parse_article(item: &Value) -> Option<NewArticle> {
    let url = item.get("url")?.as_str()?.trim();
    if url.is_empty() || url.chars().count() > URL_MAX_CHARS {
        return None;
    }

    let title = item.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }

    Some(NewArticle {
        title: title.chars().take(TITLE_MAX_CHARS).collect(),
        description: item
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        url: url.to_string(),
        published_at: item
            .get("publishedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

/// Keep at most `limit` candidates whose url is neither stored already nor repeated in the batch.
pub fn select_unsaved(
    candidates: Vec<NewArticle>,
    existing: &HashSet<String>,
    limit: usize,
) -> Vec<NewArticle> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|article| !existing.contains(&article.url))
        .filter(|article| seen.insert(article.url.clone()))
        .take(limit)
        .collect()
}
