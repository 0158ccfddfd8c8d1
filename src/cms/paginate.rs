//! Offset pagination over CMS list endpoints
//!
//! [`paginate`] turns a "fetch one page at this offset" function into a lazy
//! stream of pages. Nothing is requested until the stream is polled, every poll
//! issues exactly one request, and calling [`paginate`] again restarts from
//! offset 0.
//!
//! The stream ends when a page comes back empty, or right after a page that is
//! shorter than the limit. No total-count field is consulted.

use crate::Result;
use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;

/// Page size used against the CMS list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Stream the pages returned by `fetch(offset)` for offsets `0, limit, 2*limit, ...`
pub fn paginate<T, F, Fut>(limit: u32, mut fetch: F) -> impl Stream<Item = Result<Vec<T>>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let limit = limit.max(1);

    // State is the next offset to request; None once the listing is drained
    stream::try_unfold(Some(0u32), move |next_offset| {
        let request = next_offset.map(|offset| (offset, fetch(offset)));
        async move {
            let Some((offset, request)) = request else {
                return Ok(None);
            };

            let page = request.await?;
            if page.is_empty() {
                tracing::trace!(offset, "Empty page, pagination finished");
                return Ok(None);
            }

            let next = if page.len() < limit as usize {
                None
            } else {
                Some(offset.saturating_add(limit))
            };
            Ok(Some((page, next)))
        }
    })
}

/// Drain every page of a listing into one vector, preserving offset order
///
/// The first failing request aborts the whole collection; no partial results
/// are returned.
pub async fn collect_all<T, F, Fut>(limit: u32, fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    paginate(limit, fetch).try_concat().await
}
