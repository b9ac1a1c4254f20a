use std::sync::Arc;

use futures::future::AbortRegistration;
use tracing::{debug, warn};

use crate::clients::crm::FileQuery;
use crate::clients::{abortable, with_retry, CrmClient, RetryPolicy};
use crate::config::FilesConfig;
use crate::error::{Error, Result};
use crate::models::{CrmFile, FilePage};
use crate::session::SessionManager;

/// Paginated listing of one deal's files.
///
/// Pages accumulate in fetch order. A listing that keeps failing after its
/// retries resolves to an empty page, which also ends pagination.
pub struct FileSearch {
    crm: Arc<CrmClient>,
    session: Arc<SessionManager>,
    deal_id: String,
    limit: u32,
    sort: String,
    pages: Vec<FilePage>,
}

impl FileSearch {
    pub fn new(
        crm: Arc<CrmClient>,
        session: Arc<SessionManager>,
        deal_id: &str,
        files: &FilesConfig,
    ) -> Self {
        Self {
            crm,
            session,
            deal_id: deal_id.to_string(),
            limit: files.page_limit,
            sort: files.sort.clone(),
            pages: Vec::new(),
        }
    }

    /// Overrides the configured page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn deal_id(&self) -> &str {
        &self.deal_id
    }

    /// One page starting at `start`, without touching the accumulated pages.
    ///
    /// Only cancellation is reported as an error.
    pub async fn fetch_page(&self, start: u32, signal: Option<AbortRegistration>) -> Result<FilePage> {
        let Some(token) = self.session.access_token() else {
            debug!(
                event_name = "queries.files.no_session",
                event_domain = "queries",
                deal_id = self.deal_id.as_str(),
                "session not ready, returning an empty page"
            );
            return Ok(FilePage::empty());
        };

        let query = FileQuery {
            start,
            limit: self.limit,
            sort: self.sort.clone(),
        };
        let policy = RetryPolicy::file_listing();
        let listing = with_retry(&policy, "crm.files.list", || {
            self.crm.list_deal_files(&token, &self.deal_id, &query)
        });

        match abortable(signal, listing).await {
            Ok(page) => Ok(page),
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                warn!(
                    event_name = "queries.files.failed",
                    event_domain = "queries",
                    deal_id = self.deal_id.as_str(),
                    start,
                    "file listing gave up: {}",
                    e
                );
                Ok(FilePage::empty())
            }
        }
    }

    /// Fetches the page after the last one. Returns `false` when there is none.
    pub async fn fetch_next_page(&mut self, signal: Option<AbortRegistration>) -> Result<bool> {
        let start = match self.pages.last() {
            None => 0,
            Some(last) => match last.next_start() {
                Some(start) => start,
                None => return Ok(false),
            },
        };
        let page = self.fetch_page(start, signal).await?;
        self.pages.push(page);
        Ok(true)
    }

    /// Drops every page and loads the first one again.
    pub async fn refetch(&mut self, signal: Option<AbortRegistration>) -> Result<()> {
        let page = self.fetch_page(0, signal).await?;
        self.pages = vec![page];
        Ok(())
    }

    /// Nothing fetched yet counts as having a next page.
    pub fn has_next_page(&self) -> bool {
        self.pages
            .last()
            .map_or(true, |last| last.next_start().is_some())
    }

    pub fn pages(&self) -> &[FilePage] {
        &self.pages
    }

    /// All fetched files, in page order.
    pub fn files(&self) -> impl Iterator<Item = &CrmFile> {
        self.pages.iter().flat_map(|page| page.response.iter())
    }
}
