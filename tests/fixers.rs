mod common;

use yojitsu::application::{
    fix::{FixOptions, fix_page, fix_posts, page_context},
    patch::{Skipped, apply_rules, catalog::article_rules},
    structure::{REQUIREMENTS, check_posts, check_structure},
};

use common::{SiteTree, article_page};

fn options(dry_run: bool) -> FixOptions {
    FixOptions {
        base_href: "/yojitsu-website/".to_string(),
        public_url: "https://yamada1001.github.io/yojitsu-website/".to_string(),
        posts_prefix: "blog/posts".to_string(),
        dry_run,
        backup_dir: None,
    }
}

#[test]
fn published_pages_fail_the_check_until_fixed() {
    let site = SiteTree::new();

    let before = check_posts(&site.posts_dir()).expect("check");
    assert_eq!(before.checked, 3);
    assert_eq!(before.incomplete.len(), 3);
    let (_, missing) = &before.incomplete[0];
    assert!(missing.contains(&"Table of Contents"));
    assert!(missing.contains(&"Footer"));
    assert!(!missing.contains(&"Breadcrumb"));

    let report = fix_posts(&site.posts_dir(), &options(false)).expect("fix");
    assert_eq!(report.changed.len(), 3);
    assert!(report.skipped.is_empty());

    let after = check_posts(&site.posts_dir()).expect("recheck");
    assert!(after.is_clean(), "still missing: {:?}", after.incomplete);
}

#[test]
fn second_fix_run_changes_nothing() {
    let site = SiteTree::new();
    fix_posts(&site.posts_dir(), &options(false)).expect("first run");
    let snapshot = site.read("blog/posts/seo-basics.html");

    let report = fix_posts(&site.posts_dir(), &options(false)).expect("second run");
    assert!(report.changed.is_empty());
    assert_eq!(site.read("blog/posts/seo-basics.html"), snapshot);
}

#[test]
fn share_block_links_to_the_published_page() {
    let site = SiteTree::new();
    fix_posts(&site.posts_dir(), &options(false)).expect("fix");

    let html = site.read("blog/posts/listing-ads.html");
    assert!(html.contains(
        "https://www.facebook.com/sharer/sharer.php?u=https://yamada1001.github.io/yojitsu-website/blog/posts/listing-ads.html"
    ));
    assert_eq!(html.matches(r#"id="relatedArticles""#).count(), 1);
    assert_eq!(html.matches(r#"<script src="src/js/main.js"></script>"#).count(), 1);
    let footer = html.find(r#"<footer class="footer">"#).expect("footer");
    let body_end = html.find("</body>").expect("body end");
    assert!(footer < body_end);
}

#[test]
fn missing_anchor_is_reported_not_fatal() {
    let html = "<html><head></head><body><p>本文のみ</p></body></html>";
    let ctx = page_context(html, "bare.html", &options(false));
    let outcome = apply_rules(html, &article_rules(&ctx)).expect("apply");

    assert!(outcome.skipped.contains(&Skipped::MissingAnchor {
        rule: "share",
        anchor: ".article__content",
    }));
    assert!(outcome.applied.contains(&"footer"));
}

#[test]
fn static_related_cards_are_replaced_during_fix() {
    let page = article_page("SEOの基本", "SEO", "2025-01-01", "概要").replace(
        "            </div>\n        </div>\n    </article>",
        r#"                <aside class="related-posts"><div class="blog-card"><a href="old.html">古い記事</a></div></aside>
            </div>
        </div>
    </article>"#,
    );
    let ctx = page_context(&page, "seo-basics.html", &options(false));
    let fixed = fix_page(&page, &ctx, "/yojitsu-website/").expect("fix");

    assert!(!fixed.html.contains("old.html"));
    assert_eq!(fixed.html.matches(r#"id="relatedArticles""#).count(), 1);
    assert!(check_structure(&fixed.html).expect("check").is_empty());
}

#[test]
fn every_requirement_has_a_distinct_name() {
    let mut names: Vec<_> = REQUIREMENTS.iter().map(|r| r.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), REQUIREMENTS.len());
}

#[test]
fn relative_script_paths_satisfy_fix_and_check_alike() {
    let scripts: String = [
        "blog-loader.js",
        "main.js",
        "blog.js",
        "article-template.js",
    ]
    .iter()
    .map(|file| format!("    <script src=\"../../src/js/{file}\"></script>\n"))
    .collect();
    let page = article_page("SEOの基本", "SEO", "2025-01-01", "概要")
        .replace("</body>", &format!("{scripts}</body>"));
    let ctx = page_context(&page, "seo-basics.html", &options(false));

    let first = fix_page(&page, &ctx, "/yojitsu-website/").expect("first fix");
    assert!(!first.applied.iter().any(|rule| rule.starts_with("script:")));
    assert!(check_structure(&first.html).expect("check").is_empty());
    assert_eq!(first.html.matches("<script src=").count(), 4);

    let second = fix_page(&first.html, &ctx, "/yojitsu-website/").expect("second fix");
    assert!(!second.changed);
}
