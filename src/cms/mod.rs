//! Webflow CMS access
//!
//! Wire types for the Data API v2, the [`CmsApi`] seam with its reqwest
//! implementation, and the offset pagination used by the aggregator.

pub mod client;
pub mod model;
pub mod paginate;

pub use client::{CmsApi, CmsConnector, WebflowClient, WebflowConnector};
pub use model::{Collection, CollectionItem, ItemFieldData, Page};
pub use paginate::{collect_all, paginate, DEFAULT_PAGE_SIZE};
