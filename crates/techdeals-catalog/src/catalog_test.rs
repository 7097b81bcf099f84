use serde_json::{json, Value};
use tempfile::TempDir;
use techdeals_core::{PriceRange, ProductFilters};

use super::*;

// -----------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------

fn product(title: Option<&str>, price: &str, categories: &str) -> Value {
    json!({
        "product-url": "https://www.amazon.com/dp/B000000000",
        "title": title,
        "old-price": "$999.00",
        "new-price": price,
        "img-url": "",
        "img-alt": "",
        "categories": categories,
        "description-html": "<p>Deal.</p>",
        "meta-description": "",
        "meta-title": "",
        "discount-percent": 10
    })
}

fn write(dir: &TempDir, name: &str, value: &Value) {
    std::fs::write(dir.path().join(name), value.to_string()).expect("write fixture");
}

/// Two product files contributing three and two titled products, plus one
/// untitled record in the first file.
fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        &dir,
        "amazon_a.json",
        &json!([
            product(Some("Echo Dot"), "$49.99", "Electronics|Smart Home"),
            product(None, "$10.00", "Electronics"),
            product(Some("Cast Iron Skillet"), "$100.00", "Home|Cookware"),
            product(Some("Wireless Mouse"), "$19.99", "Computers|Accessories"),
        ]),
    );
    write(
        &dir,
        "amazon_b.json",
        &json!([
            product(Some("Espresso Machine"), "$500.00", "Kitchen|Appliances"),
            product(Some("Echo Dot"), "$39.99", "Electronics"),
        ]),
    );
    write(
        &dir,
        CATEGORIES_FILE,
        &json!([
            {"displayName": "Kitchen", "similarCategories": ["kitchen", "cookware"]},
            {"displayName": "Smart Home", "similarCategories": ["smart home"]}
        ]),
    );
    write(
        &dir,
        FEATURED_FILE,
        &json!([product(Some("Featured TV"), "$299.00", "Electronics"), product(None, "$1.00", "")]),
    );
    write(
        &dir,
        POSTS_FILE,
        &json!([
            {"slug": "first", "title": "First"},
            {"slug": "second", "title": "Second"},
            {"slug": "third", "title": "Third"}
        ]),
    );
    dir
}

fn open(dir: &TempDir, options: CatalogOptions) -> Catalog {
    Catalog::open(dir.path(), options).expect("open catalog")
}

fn titles(page: &Page<Product>) -> Vec<&str> {
    page.items
        .iter()
        .map(|p| p.trimmed_title().expect("titled"))
        .collect()
}

fn query(page: usize, limit: usize, filters: ProductFilters) -> ListQuery {
    ListQuery {
        page,
        limit,
        filters,
        max_products: None,
    }
}

// -----------------------------------------------------------------------
// list
// -----------------------------------------------------------------------

#[test]
fn list_without_filters_keeps_file_then_record_order() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let page = catalog.list(&query(1, 50, ProductFilters::default())).unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(
        titles(&page),
        vec![
            "Echo Dot",
            "Cast Iron Skillet",
            "Wireless Mouse",
            "Espresso Machine",
            "Echo Dot"
        ]
    );
}

#[test]
fn list_page_length_matches_formula() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());

    for limit in 1..=6 {
        for page in 1..=7 {
            let result = catalog.list(&query(page, limit, ProductFilters::default())).unwrap();
            let expected = limit.min(result.total.saturating_sub((page - 1) * limit));
            assert_eq!(result.items.len(), expected, "page={page} limit={limit}");
        }
    }
}

#[test]
fn list_is_idempotent() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let q = query(1, 3, ProductFilters::default());
    assert_eq!(catalog.list(&q).unwrap(), catalog.list(&q).unwrap());
}

#[test]
fn list_category_filter_matches_mapped_tokens() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let filters = ProductFilters {
        category: Some("kitchen".to_string()),
        ..ProductFilters::default()
    };
    let page = catalog.list(&query(1, 50, filters)).unwrap();
    assert_eq!(titles(&page), vec!["Cast Iron Skillet", "Espresso Machine"]);
    assert_eq!(page.total, 2);
}

#[test]
fn list_category_accepts_slug() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let filters = ProductFilters {
        category: Some("smart-home".to_string()),
        ..ProductFilters::default()
    };
    let page = catalog.list(&query(1, 50, filters)).unwrap();
    assert_eq!(titles(&page), vec!["Echo Dot"]);
}

#[test]
fn list_all_or_blank_filters_return_everything() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    for category in ["all", "ALL", "  "] {
        let filters = ProductFilters {
            category: Some(category.to_string()),
            search: Some(String::new()),
            price_range: None,
        };
        assert!(filters.is_empty());
        assert_eq!(catalog.list(&query(1, 50, filters)).unwrap().total, 5, "{category:?}");
    }
}

#[test]
fn list_unresolved_category_is_empty_when_strict() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let filters = ProductFilters {
        category: Some("Garden".to_string()),
        ..ProductFilters::default()
    };
    let page = catalog.list(&query(1, 50, filters)).unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[test]
fn list_unresolved_category_is_noop_when_permissive() {
    let dir = fixture_dir();
    let options = CatalogOptions {
        category_policy: CategoryPolicy::Permissive,
        ..CatalogOptions::default()
    };
    let catalog = open(&dir, options);
    let filters = ProductFilters {
        category: Some("Garden".to_string()),
        ..ProductFilters::default()
    };
    assert_eq!(catalog.list(&query(1, 50, filters)).unwrap().total, 5);
}

#[test]
fn list_search_and_price_range_combine_with_and() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let filters = ProductFilters {
        search: Some("echo".to_string()),
        price_range: Some(PriceRange::Under100),
        ..ProductFilters::default()
    };
    let page = catalog.list(&query(1, 50, filters)).unwrap();
    assert_eq!(page.total, 2);

    let filters = ProductFilters {
        price_range: Some(PriceRange::From300To500),
        ..ProductFilters::default()
    };
    let page = catalog.list(&query(1, 50, filters)).unwrap();
    assert_eq!(titles(&page), vec!["Espresso Machine"]);
}

#[test]
fn list_price_bounds_are_inclusive() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let in_range = |range: PriceRange| {
        let filters = ProductFilters {
            price_range: Some(range),
            ..ProductFilters::default()
        };
        titles(&catalog.list(&query(1, 50, filters)).unwrap())
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    assert!(in_range(PriceRange::From100To300).contains(&"Cast Iron Skillet".to_string()));
    assert!(!in_range(PriceRange::Under100).contains(&"Cast Iron Skillet".to_string()));
    assert!(in_range(PriceRange::From300To500).contains(&"Espresso Machine".to_string()));
    assert!(!in_range(PriceRange::Over500).contains(&"Espresso Machine".to_string()));
}

#[test]
fn list_search_spans_title_categories_and_description() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let search = |term: &str| {
        let filters = ProductFilters {
            search: Some(term.to_string()),
            ..ProductFilters::default()
        };
        catalog.list(&query(1, 50, filters)).unwrap()
    };

    assert_eq!(titles(&search("accessories")), vec!["Wireless Mouse"]);
    assert_eq!(search("gamepad").total, 0);
    assert_eq!(search("DEAL.").total, 5, "description match is case-insensitive");
}

#[test]
fn list_max_products_caps_total_before_pagination() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let q = ListQuery {
        page: 2,
        limit: 2,
        filters: ProductFilters::default(),
        max_products: Some(3),
    };
    let page = catalog.list(&q).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(titles(&page), vec!["Wireless Mouse"]);
    assert_eq!(page.total_pages(), 2);
}

#[test]
fn list_catalog_wide_cap_applies_when_query_has_none() {
    let dir = fixture_dir();
    let options = CatalogOptions {
        max_products: Some(2),
        ..CatalogOptions::default()
    };
    let catalog = open(&dir, options);
    assert_eq!(catalog.list(&query(1, 50, ProductFilters::default())).unwrap().total, 2);
}

#[test]
fn list_fails_on_malformed_file() {
    let dir = fixture_dir();
    std::fs::write(dir.path().join("amazon_c.json"), "{not json").expect("write");
    let catalog = open(&dir, CatalogOptions::default());
    let err = catalog
        .list(&query(1, 50, ProductFilters::default()))
        .expect_err("malformed file aborts the query");
    assert!(matches!(err, CatalogError::Parse { .. }));
}

#[test]
fn list_drops_untitled_records_with_null_fields() {
    let dir = fixture_dir();
    write(
        &dir,
        "amazon_c.json",
        &json!([
            {
                "product-url": null,
                "title": null,
                "old-price": null,
                "new-price": null,
                "img-url": null,
                "categories": null,
                "description-html": null,
                "discount-percent": null
            },
            product(Some("Lamp"), "$25.00", "Home|Lighting"),
        ]),
    );
    let catalog = open(&dir, CatalogOptions::default());

    let page = catalog.list(&query(1, 50, ProductFilters::default())).unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(titles(&page).last(), Some(&"Lamp"));
    assert_eq!(catalog.all_urls().unwrap().last().map(String::as_str), Some("Lamp"));

    let stats = catalog.stats().unwrap();
    assert_eq!(
        stats.last(),
        Some(&FileStats {
            file: "amazon_c.json".to_string(),
            records: 2,
            titled: 1,
            dropped: 1,
        })
    );
}

// -----------------------------------------------------------------------
// find_by_title
// -----------------------------------------------------------------------

#[test]
fn find_by_title_ignores_surrounding_whitespace() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let found = catalog.find_by_title("  Echo Dot  ").unwrap().expect("found");
    assert_eq!(found.title.as_deref(), Some("Echo Dot"));
    assert_eq!(found.new_price, "$49.99", "first file wins");
}

#[test]
fn find_by_title_requires_exact_match() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    assert!(catalog.find_by_title("Echo Dot 5th Gen").unwrap().is_none());
    assert!(catalog.find_by_title("echo dot").unwrap().is_none());
    assert!(catalog.find_by_title("   ").unwrap().is_none());
}

#[test]
fn find_by_title_cache_serves_stale_until_cleared() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    assert!(catalog.find_by_title("Wireless Mouse").unwrap().is_some());
    assert_eq!(catalog.lookup_cache().len(), 1);

    write(&dir, "amazon_a.json", &json!([]));
    assert!(
        catalog.find_by_title(" Wireless Mouse").unwrap().is_some(),
        "cached lookup survives file changes"
    );

    catalog.lookup_cache().clear();
    assert!(catalog.find_by_title("Wireless Mouse").unwrap().is_none());
}

#[test]
fn find_by_title_with_injected_cache() {
    let dir = fixture_dir();
    let cache = Arc::new(LookupCache::new(0));
    let catalog =
        Catalog::open_with_cache(dir.path(), CatalogOptions::default(), Arc::clone(&cache)).unwrap();
    assert!(catalog.find_by_title("Espresso Machine").unwrap().is_some());
    assert!(cache.is_empty());
}

// -----------------------------------------------------------------------
// all_urls / featured / posts / stats
// -----------------------------------------------------------------------

#[test]
fn all_urls_keeps_duplicates_in_order() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    assert_eq!(
        catalog.all_urls().unwrap(),
        vec![
            "Echo%20Dot",
            "Cast%20Iron%20Skillet",
            "Wireless%20Mouse",
            "Espresso%20Machine",
            "Echo%20Dot"
        ]
    );
}

#[test]
fn featured_drops_untitled() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let featured = catalog.featured().unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].trimmed_title(), Some("Featured TV"));
}

#[test]
fn category_summaries_have_slugs() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let slugs: Vec<String> = catalog
        .category_summaries()
        .into_iter()
        .map(|c| c.slug)
        .collect();
    assert_eq!(slugs, vec!["kitchen", "smart-home"]);
}

#[test]
fn posts_paginate_and_lookup_by_slug() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let page = catalog.posts(2, 2).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].slug, "third");

    assert_eq!(
        catalog.post_by_slug("second").unwrap().map(|p| p.title),
        Some("Second".to_string())
    );
    assert!(catalog.post_by_slug("missing").unwrap().is_none());
}

#[test]
fn stats_report_dropped_records() {
    let dir = fixture_dir();
    let catalog = open(&dir, CatalogOptions::default());
    let stats = catalog.stats().unwrap();
    assert_eq!(
        stats,
        vec![
            FileStats {
                file: "amazon_a.json".to_string(),
                records: 4,
                titled: 3,
                dropped: 1,
            },
            FileStats {
                file: "amazon_b.json".to_string(),
                records: 2,
                titled: 2,
                dropped: 0,
            },
        ]
    );
}

#[test]
fn open_fails_without_category_mapping() {
    let dir = fixture_dir();
    std::fs::remove_file(dir.path().join(CATEGORIES_FILE)).expect("remove");
    let err = Catalog::open(dir.path(), CatalogOptions::default()).expect_err("missing mapping");
    assert!(matches!(err, CatalogError::Io { .. }));
}

// -----------------------------------------------------------------------
// startup loading
// -----------------------------------------------------------------------

#[test]
fn startup_mode_matches_per_request_mode() {
    let dir = fixture_dir();
    let per_request = open(&dir, CatalogOptions::default());
    let startup = open(
        &dir,
        CatalogOptions {
            loading: CatalogLoading::Startup,
            ..CatalogOptions::default()
        },
    );

    let filters = ProductFilters {
        search: Some("e".to_string()),
        ..ProductFilters::default()
    };
    for page in 1..=3 {
        let q = query(page, 2, filters.clone());
        assert_eq!(per_request.list(&q).unwrap(), startup.list(&q).unwrap());
    }
    assert_eq!(per_request.all_urls().unwrap(), startup.all_urls().unwrap());
    assert_eq!(
        per_request.find_by_title("Echo Dot").unwrap(),
        startup.find_by_title("Echo Dot").unwrap()
    );
    assert_eq!(per_request.featured().unwrap(), startup.featured().unwrap());
}

#[test]
fn startup_mode_serves_from_memory() {
    let dir = fixture_dir();
    let catalog = open(
        &dir,
        CatalogOptions {
            loading: CatalogLoading::Startup,
            ..CatalogOptions::default()
        },
    );
    std::fs::remove_file(dir.path().join("amazon_a.json")).expect("remove");
    assert_eq!(catalog.list(&query(1, 50, ProductFilters::default())).unwrap().total, 5);
    assert!(catalog.find_by_title("Wireless Mouse").unwrap().is_some());
}

#[test]
fn startup_mode_opens_without_posts_file() {
    let dir = fixture_dir();
    std::fs::remove_file(dir.path().join(POSTS_FILE)).expect("remove");
    let per_request = open(&dir, CatalogOptions::default());
    let startup = open(
        &dir,
        CatalogOptions {
            loading: CatalogLoading::Startup,
            ..CatalogOptions::default()
        },
    );

    let q = query(1, 50, ProductFilters::default());
    assert_eq!(startup.list(&q).unwrap(), per_request.list(&q).unwrap());
    assert_eq!(startup.featured().unwrap(), per_request.featured().unwrap());

    assert!(matches!(
        startup.posts(1, DEFAULT_POSTS_PER_PAGE),
        Err(CatalogError::Io { .. })
    ));
    assert!(matches!(
        per_request.posts(1, DEFAULT_POSTS_PER_PAGE),
        Err(CatalogError::Io { .. })
    ));
    assert!(startup.post_by_slug("first").is_err());
}

#[test]
fn startup_mode_rereads_unavailable_featured_file() {
    let dir = fixture_dir();
    std::fs::write(dir.path().join(FEATURED_FILE), "[{").expect("write");
    let catalog = open(
        &dir,
        CatalogOptions {
            loading: CatalogLoading::Startup,
            ..CatalogOptions::default()
        },
    );
    assert!(matches!(catalog.featured(), Err(CatalogError::Parse { .. })));
    assert_eq!(catalog.posts(1, 10).unwrap().total, 3);

    write(&dir, FEATURED_FILE, &json!([product(Some("Late TV"), "$199.00", "")]));
    let featured = catalog.featured().unwrap();
    assert_eq!(featured[0].trimmed_title(), Some("Late TV"));
}
