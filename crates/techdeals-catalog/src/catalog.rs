//! The catalog query service.
//!
//! Answers listing, point-lookup and identifier queries against the product
//! files in a [`DataDir`]. In [`CatalogLoading::PerRequest`] mode every call
//! re-reads the files; in [`CatalogLoading::Startup`] mode the corpus is read
//! once by [`Catalog::open`] and served from memory.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use techdeals_core::{
    AppConfig, CatalogLoading, CategoryMapping, CategoryPolicy, CategorySummary, Post, Product,
};

use crate::cache::LookupCache;
use crate::entry::{ingest, CatalogEntry};
use crate::error::CatalogError;
use crate::identifiers::encode_title;
use crate::query::{paginate, ListQuery, Matcher, Page};
use crate::source::{DataDir, SourceFile, CATEGORIES_FILE, FEATURED_FILE, POSTS_FILE};

pub const DEFAULT_POSTS_PER_PAGE: usize = 10;

const DEFAULT_LOOKUP_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    pub category_policy: CategoryPolicy,
    pub loading: CatalogLoading,
    pub lookup_cache_capacity: usize,
    /// Catalog-wide cap on listing matches.
    pub max_products: Option<usize>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            category_policy: CategoryPolicy::default(),
            loading: CatalogLoading::default(),
            lookup_cache_capacity: DEFAULT_LOOKUP_CACHE_CAPACITY,
            max_products: None,
        }
    }
}

impl CatalogOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            category_policy: config.category_policy,
            loading: config.catalog_loading,
            lookup_cache_capacity: config.lookup_cache_capacity,
            max_products: config.max_products,
        }
    }
}

/// Record counts for one product source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub file: String,
    pub records: usize,
    pub titled: usize,
    pub dropped: usize,
}

/// In-memory corpus built at startup.
#[derive(Debug)]
struct Snapshot {
    entries: Vec<CatalogEntry>,
    /// Trimmed title → index of its first entry.
    title_index: HashMap<String, usize>,
    /// `None` when the file failed to load; readers then go back to disk.
    featured: Option<Vec<Product>>,
    posts: Option<Vec<Post>>,
}

#[derive(Debug)]
pub struct Catalog {
    data: DataDir,
    categories: Vec<CategoryMapping>,
    options: CatalogOptions,
    cache: Arc<LookupCache>,
    snapshot: Option<Snapshot>,
}

impl Catalog {
    /// Opens the catalog with a fresh lookup cache sized from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the category mapping cannot be read, or, in
    /// startup mode, if any product file cannot be read or parsed. A missing
    /// or malformed featured or posts file only fails the calls that read it.
    pub fn open(root: impl Into<PathBuf>, options: CatalogOptions) -> Result<Self, CatalogError> {
        let cache = Arc::new(LookupCache::new(options.lookup_cache_capacity));
        Self::open_with_cache(root, options, cache)
    }

    /// Opens the catalog using a caller-provided lookup cache.
    ///
    /// # Errors
    ///
    /// See [`Catalog::open`].
    pub fn open_with_cache(
        root: impl Into<PathBuf>,
        options: CatalogOptions,
        cache: Arc<LookupCache>,
    ) -> Result<Self, CatalogError> {
        let data = DataDir::new(root);
        let categories: Vec<CategoryMapping> = data.read_json(CATEGORIES_FILE)?;

        let snapshot = match options.loading {
            CatalogLoading::PerRequest => None,
            CatalogLoading::Startup => Some(load_snapshot(&data)?),
        };

        tracing::info!(
            data_dir = %data.root().display(),
            categories = categories.len(),
            loading = %options.loading,
            policy = %options.category_policy,
            "catalog opened"
        );

        Ok(Self {
            data,
            categories,
            options,
            cache,
            snapshot,
        })
    }

    #[must_use]
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    #[must_use]
    pub fn lookup_cache(&self) -> &Arc<LookupCache> {
        &self.cache
    }

    #[must_use]
    pub fn data_dir(&self) -> &DataDir {
        &self.data
    }

    /// Lists one page of products matching `query.filters`.
    ///
    /// Results keep file order then in-file order. The match count is capped
    /// by `query.max_products` (or the catalog-wide cap) before slicing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any product file cannot be read or parsed.
    pub fn list(&self, query: &ListQuery) -> Result<Page<Product>, CatalogError> {
        let entries = self.entries()?;
        let mut matched: Vec<&CatalogEntry> = if query.filters.is_empty() {
            entries.iter().collect()
        } else {
            let matcher =
                Matcher::new(&query.filters, &self.categories, self.options.category_policy);
            entries.iter().filter(|e| matcher.matches(e)).collect()
        };

        let cap = query
            .max_products
            .or(self.options.max_products)
            .filter(|&cap| cap > 0);
        if let Some(cap) = cap {
            matched.truncate(cap);
        }
        let total = matched.len();

        Ok(paginate(matched, total, query.page, query.limit).map(|e| e.product.clone()))
    }

    /// Finds the first product, in file order, whose trimmed title equals the
    /// trimmed `title`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if a file scanned before the match cannot be
    /// read or parsed.
    pub fn find_by_title(&self, title: &str) -> Result<Option<Product>, CatalogError> {
        let wanted = title.trim();
        if wanted.is_empty() {
            return Ok(None);
        }

        if let Some(snapshot) = &self.snapshot {
            return Ok(snapshot
                .title_index
                .get(wanted)
                .map(|&idx| snapshot.entries[idx].product.clone()));
        }

        for file in self.data.product_files()? {
            if let Some(hit) = self.cache.get(&file.name, wanted) {
                tracing::debug!(file = %file.name, title = wanted, "title lookup cache hit");
                return Ok(Some(hit));
            }

            let ingested = read_source(&file)?;
            if let Some(entry) = ingested.into_iter().find(|e| e.title == wanted) {
                self.cache.insert(&file.name, &entry.title, entry.product.clone());
                return Ok(Some(entry.product));
            }
        }

        Ok(None)
    }

    /// One URL-safe identifier per titled product, file order then in-file
    /// order, duplicates kept.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any product file cannot be read or parsed.
    pub fn all_urls(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .entries()?
            .iter()
            .map(|e| encode_title(&e.title))
            .collect())
    }

    /// Landing-page featured products, untitled records dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if `featured.json` cannot be read or parsed.
    pub fn featured(&self) -> Result<Vec<Product>, CatalogError> {
        match self.snapshot.as_ref().and_then(|s| s.featured.as_ref()) {
            Some(featured) => Ok(featured.clone()),
            None => read_featured(&self.data),
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryMapping] {
        &self.categories
    }

    #[must_use]
    pub fn category_summaries(&self) -> Vec<CategorySummary> {
        self.categories.iter().map(CategoryMapping::summary).collect()
    }

    /// One page of blog posts in file order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if `posts.json` cannot be read or parsed.
    pub fn posts(&self, page: usize, per_page: usize) -> Result<Page<Post>, CatalogError> {
        let posts = self.all_posts()?;
        let total = posts.len();
        Ok(paginate(posts.into_owned(), total, page, per_page))
    }

    /// Finds a post by exact slug.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if `posts.json` cannot be read or parsed.
    pub fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, CatalogError> {
        Ok(self.all_posts()?.iter().find(|p| p.slug == slug).cloned())
    }

    /// Reads every product file from disk and reports record counts.
    ///
    /// Always reads from disk, regardless of loading mode.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] encountered.
    pub fn stats(&self) -> Result<Vec<FileStats>, CatalogError> {
        self.data
            .product_files()?
            .iter()
            .map(|file| -> Result<FileStats, CatalogError> {
                let products: Vec<Product> = crate::source::read_json_file(&file.path)?;
                let ingested = ingest(&file.name, products);
                Ok(FileStats {
                    file: file.name.clone(),
                    records: ingested.records,
                    titled: ingested.entries.len(),
                    dropped: ingested.dropped,
                })
            })
            .collect()
    }

    fn entries(&self) -> Result<Cow<'_, [CatalogEntry]>, CatalogError> {
        match &self.snapshot {
            Some(snapshot) => Ok(Cow::Borrowed(&snapshot.entries)),
            None => load_entries(&self.data).map(Cow::Owned),
        }
    }

    fn all_posts(&self) -> Result<Cow<'_, [Post]>, CatalogError> {
        match self.snapshot.as_ref().and_then(|s| s.posts.as_deref()) {
            Some(posts) => Ok(Cow::Borrowed(posts)),
            None => self.data.read_json::<Vec<Post>>(POSTS_FILE).map(Cow::Owned),
        }
    }
}

fn read_source(file: &SourceFile) -> Result<Vec<CatalogEntry>, CatalogError> {
    let products: Vec<Product> = crate::source::read_json_file(&file.path)?;
    Ok(ingest(&file.name, products).entries)
}

fn load_entries(data: &DataDir) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();
    for file in data.product_files()? {
        entries.extend(read_source(&file)?);
    }
    Ok(entries)
}

fn read_featured(data: &DataDir) -> Result<Vec<Product>, CatalogError> {
    let featured: Vec<Product> = data.read_json(FEATURED_FILE)?;
    Ok(featured
        .into_iter()
        .filter(|p| p.trimmed_title().is_some())
        .collect())
}

/// Keeps a snapshot file that loaded; logs and forgets one that did not.
fn optional<T>(file: &str, result: Result<Vec<T>, CatalogError>) -> Option<Vec<T>> {
    match result {
        Ok(items) => Some(items),
        Err(error) => {
            tracing::warn!(
                file,
                error = %error,
                "snapshot file unavailable; calls that need it re-read from disk"
            );
            None
        }
    }
}

fn load_snapshot(data: &DataDir) -> Result<Snapshot, CatalogError> {
    let entries = load_entries(data)?;

    let mut title_index = HashMap::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        title_index.entry(entry.title.clone()).or_insert(idx);
    }

    let featured = optional(FEATURED_FILE, read_featured(data));
    let posts = optional(POSTS_FILE, data.read_json::<Vec<Post>>(POSTS_FILE));

    tracing::info!(
        products = entries.len(),
        featured = featured.as_ref().map(Vec::len),
        posts = posts.as_ref().map(Vec::len),
        "catalog snapshot loaded"
    );

    Ok(Snapshot {
        entries,
        title_index,
        featured,
        posts,
    })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
