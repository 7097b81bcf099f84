use crate::affiliate::DEFAULT_AFFILIATE_TAG;
use crate::app_config::{AppConfig, CatalogLoading, CategoryPolicy, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing is decoupled from the real environment so it can be tested with a
/// pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("TECHDEALS_ENV", "development"));
    let bind_addr = parse_addr("TECHDEALS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("TECHDEALS_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("TECHDEALS_DATA_DIR", "./data"));

    let site_url = or_default("TECHDEALS_SITE_URL", "http://localhost:3000")
        .trim_end_matches('/')
        .to_string();
    if site_url.is_empty() {
        return Err(ConfigError::Validation(
            "TECHDEALS_SITE_URL must be non-empty".to_string(),
        ));
    }

    let affiliate_tag = or_default("TECHDEALS_AFFILIATE_TAG", DEFAULT_AFFILIATE_TAG)
        .trim()
        .to_string();
    if affiliate_tag.is_empty() {
        return Err(ConfigError::Validation(
            "TECHDEALS_AFFILIATE_TAG must be non-empty".to_string(),
        ));
    }

    let category_policy = parse_category_policy(&or_default("TECHDEALS_CATEGORY_POLICY", "strict"))
        .map_err(|reason| invalid("TECHDEALS_CATEGORY_POLICY", reason))?;
    let catalog_loading =
        parse_catalog_loading(&or_default("TECHDEALS_CATALOG_LOADING", "per-request"))
            .map_err(|reason| invalid("TECHDEALS_CATALOG_LOADING", reason))?;

    let lookup_cache_capacity = parse_usize("TECHDEALS_LOOKUP_CACHE_CAPACITY", "1024")?;
    let max_products = match lookup("TECHDEALS_MAX_PRODUCTS") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<usize>()
                .map_err(|e| invalid("TECHDEALS_MAX_PRODUCTS", e.to_string()))?,
        ),
        _ => None,
    };

    let rate_limit_per_minute = parse_usize("TECHDEALS_RATE_LIMIT_PER_MINUTE", "240")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "TECHDEALS_RATE_LIMIT_PER_MINUTE",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        site_url,
        affiliate_tag,
        category_policy,
        catalog_loading,
        lookup_cache_capacity,
        max_products,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_category_policy(s: &str) -> Result<CategoryPolicy, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(CategoryPolicy::Strict),
        "permissive" => Ok(CategoryPolicy::Permissive),
        other => Err(format!("expected 'strict' or 'permissive', got '{other}'")),
    }
}

fn parse_catalog_loading(s: &str) -> Result<CatalogLoading, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "per-request" => Ok(CatalogLoading::PerRequest),
        "startup" => Ok(CatalogLoading::Startup),
        other => Err(format!("expected 'per-request' or 'startup', got '{other}'")),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
