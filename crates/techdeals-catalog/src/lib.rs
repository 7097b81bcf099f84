pub mod cache;
pub mod catalog;
pub mod entry;
pub mod error;
pub mod identifiers;
pub mod query;
pub mod source;

pub use cache::LookupCache;
pub use catalog::{Catalog, CatalogOptions, FileStats, DEFAULT_POSTS_PER_PAGE};
pub use entry::CatalogEntry;
pub use error::CatalogError;
pub use identifiers::encode_title;
pub use query::{ListQuery, Page, DEFAULT_PAGE_LIMIT};
pub use source::DataDir;
