mod common;

use time::macros::date;
use yojitsu::application::{
    extract::ExtractOptions,
    sitemap::generate_sitemap,
    sync::build_store,
};

use common::SiteTree;

fn synced_store(site: &SiteTree) -> yojitsu::domain::articles::ArticleStore {
    build_store(
        &site.posts_dir(),
        &ExtractOptions {
            posts_prefix: "blog/posts".to_string(),
            fallback_date: date!(2025 - 06 - 30),
        },
    )
    .expect("sync")
    .store
}

#[test]
fn sitemap_lists_every_page_group() {
    let site = SiteTree::new();
    let store = synced_store(&site);
    let xml = generate_sitemap(&store, "https://yojitsu.com/", date!(2025 - 02 - 01)).expect("sitemap");

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert_eq!(xml.matches("<url>").count(), 2 + 7 + 3 + 3);
    assert!(xml.contains("<loc>https://yojitsu.com/</loc>"));
    assert!(xml.contains("<loc>https://yojitsu.com/blog/posts/seo-advanced.html</loc>\n    <lastmod>2025-01-05</lastmod>"));
    assert!(xml.contains("<loc>https://yojitsu.com/blog/categories/seo.html</loc>\n    <lastmod>2025-01-05</lastmod>"));
    assert!(xml.contains("<loc>https://yojitsu.com/blog/categories/ai.html</loc>\n    <lastmod>2025-02-01</lastmod>"));
    assert!(xml.contains("<loc>https://yojitsu.com/privacy-policy.html</loc>\n    <lastmod>2025-01-01</lastmod>"));
    assert!(xml.ends_with("</urlset>\n"));
}

#[test]
fn sitemap_is_deterministic_for_a_fixed_day() {
    let site = SiteTree::new();
    let store = synced_store(&site);
    let first = generate_sitemap(&store, "https://yojitsu.com", date!(2025 - 02 - 01)).expect("first");
    let second = generate_sitemap(&store, "https://yojitsu.com", date!(2025 - 02 - 01)).expect("second");
    assert_eq!(first, second);
}

#[test]
fn article_order_follows_the_store() {
    let site = SiteTree::new();
    let store = synced_store(&site);
    let xml = generate_sitemap(&store, "https://yojitsu.com", date!(2025 - 02 - 01)).expect("sitemap");

    let advanced = xml.find("seo-advanced.html").expect("advanced");
    let ads = xml.find("listing-ads.html").expect("ads");
    let basics = xml.find("seo-basics.html").expect("basics");
    assert!(advanced < ads && ads < basics);
}

#[test]
fn invalid_base_url_is_rejected() {
    let site = SiteTree::new();
    let store = synced_store(&site);
    assert!(generate_sitemap(&store, "yojitsu.com", date!(2025 - 02 - 01)).is_err());
}
