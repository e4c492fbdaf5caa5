//! Cursor pagination

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::config::{feishu, fetch};
use crate::error::{OrgError, Result};

/// Trait for listing responses that carry a continuation cursor
///
/// Implement this for a page envelope to drive it with [`fetch_all`].
pub trait PaginatedResponse {
    type Item;

    /// Whether the server has more items after this page
    fn has_more(&self) -> bool;
    /// Opaque cursor to echo back for the next page
    fn next_page_token(&self) -> Option<&str>;
    /// Consume self and return the page's items
    fn into_data(self) -> Vec<Self::Item>;
}

/// Pacing and bounds for one listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingOptions {
    /// Pause between consecutive page requests
    pub interval: Duration,
    /// Give up with [`OrgError::PageLimit`] after this many pages
    pub max_pages: usize,
}

impl Default for PagingOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(feishu::PAGE_INTERVAL_MS),
            max_pages: fetch::MAX_PAGES,
        }
    }
}

/// Fetch every page of a listing and concatenate the items in call order.
///
/// `fetch_page` receives `None` for the first page and the previous page's
/// cursor afterwards. A failed page fails the whole listing; retrying is
/// left to the caller.
pub async fn fetch_all<P, F, Fut>(
    options: PagingOptions,
    label: &str,
    mut fetch_page: F,
) -> Result<Vec<P::Item>>
where
    P: PaginatedResponse,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if pages >= options.max_pages {
            warn!("{}: stopping after {} pages", label, pages);
            return Err(OrgError::PageLimit { pages });
        }

        let page = fetch_page(cursor.take()).await?;
        pages += 1;

        let has_more = page.has_more();
        let next = page
            .next_page_token()
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let data = page.into_data();
        debug!(
            "{}: page {} returned {} items (has_more={})",
            label,
            pages,
            data.len(),
            has_more
        );
        items.extend(data);

        if !has_more {
            break;
        }
        let Some(next) = next else {
            warn!("{}: server reported more pages without a cursor", label);
            break;
        };

        tokio::time::sleep(options.interval).await;
        cursor = Some(next);
    }

    debug!("{}: fetched {} items in {} pages", label, items.len(), pages);
    Ok(items)
}
