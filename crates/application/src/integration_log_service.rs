use std::sync::Arc;

use scope_auditor_core::{AppError, AppResult};
use scope_auditor_domain::{IntegrationLogPage, LogEvent};
use tracing::{debug, info};

use crate::{IntegrationLogQuery, IntegrationLogSource, MAX_PAGE_SIZE};


/// Progress snapshot reported after each fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationProgress {
    /// Page that was just fetched, 1-based.
    pub current_page: u32,
    /// Total pages reported by the server.
    pub total_pages: u32,
    /// Records accumulated so far.
    pub records_fetched: usize,
}

/// Application service owning integration log pagination.
#[derive(Clone)]
pub struct IntegrationLogService {
    source: Arc<dyn IntegrationLogSource>,
}

struct PagingState {
    page: u32,
    total_pages: u32,
    records: Vec<LogEvent>,
}

impl IntegrationLogService {
    /// Creates a service from a log source implementation.
    #[must_use]
    pub fn new(source: Arc<dyn IntegrationLogSource>) -> Self {
        Self { source }
    }

    /// Fetches a single page.
    pub async fn fetch_page(
        &self,
        query: &IntegrationLogQuery,
        page: u32,
    ) -> AppResult<IntegrationLogPage> {
        if page == 0 {
            return Err(AppError::Validation("page numbers start at 1".to_owned()));
        }

        let page_size = validated_page_size(query)?;
        self.source.fetch_page(query, page, page_size).await
    }

    /// Fetches every page, stopping early once `limit` records are collected.
    ///
    /// A `limit` of zero means no limit.
    pub async fn fetch_all(
        &self,
        query: &IntegrationLogQuery,
        limit: Option<usize>,
    ) -> AppResult<Vec<LogEvent>> {
        self.fetch_all_with_progress(query, limit, |_| {}).await
    }

    /// Same as [`Self::fetch_all`], invoking `on_progress` after each page.
    ///
    /// Pages are requested one at a time, so progress is reported in page
    /// order. Any error aborts the walk and discards collected records.
    pub async fn fetch_all_with_progress<F>(
        &self,
        query: &IntegrationLogQuery,
        limit: Option<usize>,
        mut on_progress: F,
    ) -> AppResult<Vec<LogEvent>>
    where
        F: FnMut(PaginationProgress),
    {
        let limit = limit.filter(|limit| *limit > 0);
        let page_size = validated_page_size(query)?;
        let mut state = PagingState {
            page: 1,
            total_pages: 1,
            records: Vec::new(),
        };

        loop {
            let response = self.source.fetch_page(query, state.page, page_size).await?;
            state.total_pages = response.paging.pages;
            state.records.extend(response.logs);

            debug!(
                page = state.page,
                total_pages = state.total_pages,
                records_fetched = state.records.len(),
                "fetched integration log page"
            );

            on_progress(PaginationProgress {
                current_page: state.page,
                total_pages: state.total_pages,
                records_fetched: state.records.len(),
            });

            if let Some(limit) = limit
                && state.records.len() >= limit
            {
                state.records.truncate(limit);
                info!(
                    limit,
                    pages_fetched = state.page,
                    "integration log fetch stopped at record limit"
                );
                return Ok(state.records);
            }

            match state.page.checked_add(1) {
                Some(next) if next <= state.total_pages => state.page = next,
                _ => break,
            }
        }

        info!(
            pages_fetched = state.page,
            records_fetched = state.records.len(),
            "integration log fetch completed"
        );

        Ok(state.records)
    }
}

fn validated_page_size(query: &IntegrationLogQuery) -> AppResult<u32> {
    let page_size = query.page_size();
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        )));
    }

    Ok(page_size)
}
