//! Selector-based extraction of listing rows and post pages
//!
//! Both extractors are pure functions over fetched HTML: the orchestrator
//! fetches, these modules turn markup into the typed model. Parsed
//! documents never cross an await point, so the extraction layer stays
//! usable from spawned tasks.

mod listing;
mod post;

pub use listing::{count_pinned_rows, extract_row, parse_listing_page};
pub use post::parse_post;
