use crate::connectors::{EverythingQuery, HeadlinesQuery};
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl From<SearchQuery> for EverythingQuery {
    fn from(query: SearchQuery) -> Self {
        EverythingQuery {
            q: query.q,
            page: query.page,
            page_size: query.page_size,
            from: query.from,
            to: query.to,
            sort_by: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HeadlinesFilter {
    pub source: Option<String>,
    pub country: Option<String>,
}

impl HeadlinesFilter {
    /// `None` when neither a source nor a country was given
    pub fn into_query(self) -> Option<HeadlinesQuery> {
        let source = self.source.filter(|s| !s.trim().is_empty());
        let country = self.country.filter(|c| !c.trim().is_empty());
        if source.is_none() && country.is_none() {
            return None;
        }
        Some(HeadlinesQuery {
            country,
            sources: source,
        })
    }

    pub fn describe(query: &HeadlinesQuery) -> String {
        let mut parts = vec![];
        if let Some(source) = &query.sources {
            parts.push(format!("source: {}", source));
        }
        if let Some(country) = &query.country {
            parts.push(format!("country: {}", country));
        }
        format!("Top headlines for {}", parts.join(", "))
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl TryFrom<PageQuery> for Pagination {
    type Error = String;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        let page = query.page.unwrap_or(1);
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err("page must be at least 1".to_string());
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(format!("page_size must be between 1 and {}", MAX_PAGE_SIZE));
        }

        Ok(Pagination { page, page_size })
    }
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}
