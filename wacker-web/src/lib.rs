//! Content extraction for wiki and generic web pages.
//!
//! - Strategy selection by host and path (`strategy`)
//! - MediaWiki `api.php` parse client (`mediawiki`)
//! - Semantic-container extraction for arbitrary pages (`extract`)
//! - Content-wrapper cut for raw wiki HTML (`wrapper`)
//! - Lazy-image and relative-link rewriting (`rewrite`)
//!
//! [`Extractor`] ties them together behind one call.

pub mod extract;
pub mod extractor;
mod fetch;
pub mod mediawiki;
pub mod rewrite;
pub mod strategy;
pub mod wrapper;

pub use extractor::Extractor;
pub use strategy::{Plan, Strategy};
