//! Command handlers. Each writes its report to `out` so tests can capture it.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use techdeals_catalog::{Catalog, CatalogOptions, ListQuery};
use techdeals_core::{affiliate_link, CategoryPolicy, PriceRange, ProductFilters};

#[derive(Debug, Clone, Default)]
pub(crate) struct ListArgs {
    pub page: usize,
    pub limit: usize,
    pub category: Option<String>,
    pub search: Option<String>,
    pub price_range: Option<PriceRange>,
    pub max: Option<usize>,
    pub permissive: bool,
}

fn open_catalog(data_dir: &Path, policy: CategoryPolicy) -> anyhow::Result<Catalog> {
    let options = CatalogOptions {
        category_policy: policy,
        ..CatalogOptions::default()
    };
    Catalog::open(data_dir, options)
        .with_context(|| format!("failed to open catalog at {}", data_dir.display()))
}

/// Prints `total=N` and one `title | price | discount%` line per product.
pub(crate) fn run_list(data_dir: &Path, args: &ListArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let policy = if args.permissive {
        CategoryPolicy::Permissive
    } else {
        CategoryPolicy::Strict
    };
    let catalog = open_catalog(data_dir, policy)?;

    let query = ListQuery {
        page: args.page,
        limit: args.limit,
        filters: ProductFilters {
            category: args.category.clone(),
            search: args.search.clone(),
            price_range: args.price_range,
        },
        max_products: args.max,
    };
    let page = catalog.list(&query)?;

    writeln!(
        out,
        "total={} page={} pages={}",
        page.total,
        page.page,
        page.total_pages()
    )?;
    for product in &page.items {
        writeln!(
            out,
            "{} | {} | {}%",
            product.trimmed_title().unwrap_or_default(),
            product.new_price,
            product.discount_percent
        )?;
    }
    Ok(())
}

/// Prints the product as pretty JSON followed by its affiliate link.
///
/// # Errors
///
/// Fails when `tag` is blank or no product has exactly this title.
pub(crate) fn run_show(
    data_dir: &Path,
    title: &str,
    tag: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    anyhow::ensure!(!tag.trim().is_empty(), "affiliate tag must not be empty");
    let catalog = open_catalog(data_dir, CategoryPolicy::default())?;
    let product = catalog
        .find_by_title(title)?
        .ok_or_else(|| anyhow::anyhow!("product '{}' not found", title.trim()))?;

    writeln!(out, "{}", serde_json::to_string_pretty(&product)?)?;
    writeln!(out, "affiliate: {}", affiliate_link(&product.product_url, tag.trim()))?;
    Ok(())
}

pub(crate) fn run_urls(data_dir: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let catalog = open_catalog(data_dir, CategoryPolicy::default())?;
    for id in catalog.all_urls()? {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

pub(crate) fn run_categories(data_dir: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let catalog = open_catalog(data_dir, CategoryPolicy::default())?;
    for category in catalog.category_summaries() {
        writeln!(out, "{}\t{}", category.slug, category.name)?;
    }
    Ok(())
}

pub(crate) fn run_affiliate(url: &str, tag: &str, out: &mut impl Write) -> anyhow::Result<()> {
    anyhow::ensure!(!tag.trim().is_empty(), "affiliate tag must not be empty");
    writeln!(out, "{}", affiliate_link(url, tag.trim()))?;
    Ok(())
}

/// Reads every product file and prints per-file counts.
///
/// # Errors
///
/// Fails on the first unreadable or malformed file.
pub(crate) fn run_check(data_dir: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let catalog = open_catalog(data_dir, CategoryPolicy::default())?;
    let stats = catalog.stats()?;

    writeln!(out, "{:<40}{:>10}{:>10}{:>10}", "FILE", "RECORDS", "TITLED", "DROPPED")?;
    for file in &stats {
        writeln!(
            out,
            "{:<40}{:>10}{:>10}{:>10}",
            file.file, file.records, file.titled, file.dropped
        )?;
    }

    let titled: usize = stats.iter().map(|f| f.titled).sum();
    let dropped: usize = stats.iter().map(|f| f.dropped).sum();
    writeln!(
        out,
        "{} files, {titled} products, {dropped} dropped",
        stats.len()
    )?;
    tracing::info!(files = stats.len(), titled, dropped, "catalog check complete");
    Ok(())
}
