pub mod affiliate;
pub mod app_config;
pub mod cart;
pub mod categories;
pub mod config;
pub mod filters;
pub mod money;
pub mod posts;
pub mod products;

use thiserror::Error;

pub use affiliate::{affiliate_link, extract_asin, DEFAULT_AFFILIATE_TAG};
pub use app_config::{AppConfig, CatalogLoading, CategoryPolicy, Environment};
pub use cart::{summarize_cart, CartLine, CartSummary};
pub use categories::{CategoryMapping, CategorySummary};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::{PriceRange, ProductFilters};
pub use money::{parse_price, to_cents};
pub use posts::Post;
pub use products::Product;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown price range: {0}")]
    UnknownPriceRange(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
