use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What a category filter does when the requested name matches no mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryPolicy {
    /// Unknown categories match nothing.
    #[default]
    Strict,
    /// Unknown categories apply no filtering at all.
    Permissive,
}

impl std::fmt::Display for CategoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryPolicy::Strict => write!(f, "strict"),
            CategoryPolicy::Permissive => write!(f, "permissive"),
        }
    }
}

/// When the catalog reads its product files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogLoading {
    /// Re-read every source file on each query.
    #[default]
    PerRequest,
    /// Read the corpus once when the catalog opens and serve from memory.
    Startup,
}

impl std::fmt::Display for CatalogLoading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLoading::PerRequest => write!(f, "per-request"),
            CatalogLoading::Startup => write!(f, "startup"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub data_dir: PathBuf,
    /// Public base URL used in sitemap `<loc>` entries, without a trailing `/`.
    pub site_url: String,
    pub affiliate_tag: String,
    pub category_policy: CategoryPolicy,
    pub catalog_loading: CatalogLoading,
    /// Lookup cache capacity in entries; `0` disables the cache.
    pub lookup_cache_capacity: usize,
    /// Optional global cap on how many matches a listing may report.
    pub max_products: Option<usize>,
    pub rate_limit_per_minute: usize,
}
