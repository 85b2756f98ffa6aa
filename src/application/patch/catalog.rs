//! Canonical article-page blocks and the ordered rule set that ensures them.

use std::borrow::Cow;

use url::form_urlencoded::byte_serialize;

use super::{InsertMode, PatchRule};

/// Per-page values substituted into fragments that link back to the page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub page_url: String,
    pub title: String,
}

/// A script every article page loads. `marker` matches the tag regardless of
/// how deep the page sits relative to `src/js/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredScript {
    pub src: &'static str,
    pub marker: &'static str,
}

pub const REQUIRED_SCRIPTS: [RequiredScript; 4] = [
    RequiredScript {
        src: "src/js/blog-loader.js",
        marker: r#"script[src$="js/blog-loader.js"]"#,
    },
    RequiredScript {
        src: "src/js/main.js",
        marker: r#"script[src$="js/main.js"]"#,
    },
    RequiredScript {
        src: "src/js/blog.js",
        marker: r#"script[src$="js/blog.js"]"#,
    },
    RequiredScript {
        src: "src/js/article-template.js",
        marker: r#"script[src$="js/article-template.js"]"#,
    },
];

pub const TOC_FRAGMENT: &str = r#"<nav class="article__toc">
                    <h2 class="article__toc-title">目次</h2>
                    <ul class="article__toc-list"></ul>
                </nav>
"#;

pub const RELATED_FRAGMENT: &str = r#"
                <aside class="related-posts">
                    <h2 class="related-posts__title">関連記事</h2>
                    <div class="related-posts__grid" id="relatedArticles"></div>
                </aside>"#;

pub const SIDEBAR_FRAGMENT: &str = r#"
            <aside class="article__sidebar">
                <nav class="sidebar-toc" id="sidebarToc"></nav>
            </aside>
"#;

pub const FLOATING_TOC_FRAGMENT: &str = r#"
    <button class="floating-toc-btn" id="floatingTocBtn" aria-label="目次を開く">
        <svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
            <line x1="3" y1="6" x2="21" y2="6"/>
            <line x1="3" y1="12" x2="21" y2="12"/>
            <line x1="3" y1="18" x2="21" y2="18"/>
        </svg>
    </button>"#;

pub const MOBILE_TOC_FRAGMENT: &str = r#"
    <div class="mobile-toc-modal" id="mobileTocModal">
        <div class="mobile-toc-modal__content">
            <div class="mobile-toc-modal__header">
                <h3 class="mobile-toc-modal__title">目次</h3>
                <button class="mobile-toc-modal__close" id="closeMobileToc" aria-label="閉じる">
                    <svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2">
                        <line x1="18" y1="6" x2="6" y2="18"/>
                        <line x1="6" y1="6" x2="18" y2="18"/>
                    </svg>
                </button>
            </div>
            <ul class="mobile-toc-modal__list" id="mobileTocList"></ul>
        </div>
    </div>"#;

pub const FOOTER_FRAGMENT: &str = r#"<footer class="footer">
        <div class="container">
            <div class="footer__content">
                <div class="footer__brand">
                    <a href="index.html" class="footer__logo">余日</a>
                    <p class="footer__tagline">本質に向き合い、成長を加速させる</p>
                </div>
                <nav class="footer__nav">
                    <div class="footer__nav-column">
                        <h4 class="footer__nav-title">サービス</h4>
                        <ul class="footer__nav-list">
                            <li><a href="index.html#services">SEO対策</a></li>
                            <li><a href="index.html#services">広告運用代行</a></li>
                            <li><a href="index.html#services">プランニング</a></li>
                            <li><a href="index.html#services">SNS運用代行</a></li>
                            <li><a href="index.html#services">CRM導入支援</a></li>
                            <li><a href="index.html#services">サイト制作/PM・ディレクション</a></li>
                        </ul>
                    </div>
                    <div class="footer__nav-column">
                        <h4 class="footer__nav-title">ブログ</h4>
                        <ul class="footer__nav-list">
                            <li><a href="blog/categories/seo.html">SEO</a></li>
                            <li><a href="blog/categories/ads.html">広告運用</a></li>
                            <li><a href="blog/categories/sns.html">SNS</a></li>
                            <li><a href="blog/categories/marketing.html">マーケティング</a></li>
                            <li><a href="blog/categories/web-production.html">Web制作</a></li>
                            <li><a href="blog/categories/misc.html">雑記</a></li>
                        </ul>
                    </div>
                    <div class="footer__nav-column">
                        <h4 class="footer__nav-title">企業情報</h4>
                        <ul class="footer__nav-list">
                            <li><a href="index.html#about">プロフィール</a></li>
                            <li><a href="index.html#contact">お問い合わせ</a></li>
                        </ul>
                    </div>
                </nav>
            </div>
            <div class="footer__bottom">
                <p class="footer__copyright">&copy; 2025 余日（ヨジツ）All rights reserved.</p>
            </div>
        </div>
    </footer>
"#;

pub const FAVICON_FRAGMENT: &str =
    "    <link rel=\"icon\" type=\"image/svg+xml\" href=\"favicon.svg\">\n";

pub const FONT_AWESOME_FRAGMENT: &str = "    <link rel=\"stylesheet\" href=\"https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css\">\n";

pub const GOOGLE_FONTS_FRAGMENT: &str = r#"    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="https://fonts.googleapis.com/css2?family=Noto+Sans+JP:wght@400;500;700&display=swap" rel="stylesheet">
"#;

pub fn share_fragment(ctx: &PageContext) -> String {
    let url = &ctx.page_url;
    let text: String = byte_serialize(ctx.title.as_bytes()).collect();
    format!(
        r#"
                <div class="article__share">
                    <h3 class="article__share-title">この記事をシェア</h3>
                    <div class="article__share-buttons">
                        <a href="https://twitter.com/intent/tweet?url={url}&amp;text={text}" class="share-btn" target="_blank" rel="noopener">Twitter</a>
                        <a href="https://www.facebook.com/sharer/sharer.php?u={url}" class="share-btn" target="_blank" rel="noopener">Facebook</a>
                        <a href="https://social-plugins.line.me/lineit/share?url={url}" class="share-btn" target="_blank" rel="noopener">LINE</a>
                        <button class="share-btn" type="button" data-copy-url="{url}">URLをコピー</button>
                    </div>
                </div>"#
    )
}

pub fn footer_rule() -> PatchRule {
    PatchRule {
        name: "footer",
        marker: "footer.footer",
        anchor: "body",
        mode: InsertMode::Append,
        fragment: Cow::Borrowed(FOOTER_FRAGMENT),
    }
}

fn script_rule(name: &'static str, script: &RequiredScript) -> PatchRule {
    PatchRule {
        name,
        marker: script.marker,
        anchor: "body",
        mode: InsertMode::Append,
        fragment: Cow::Owned(format!("    <script src=\"{}\"></script>\n", script.src)),
    }
}

/// The full rule set in application order. Later rules may anchor on blocks
/// inserted by earlier ones.
pub fn article_rules(ctx: &PageContext) -> Vec<PatchRule> {
    vec![
        PatchRule {
            name: "toc",
            marker: "nav.article__toc",
            anchor: ".article__content",
            mode: InsertMode::Before,
            fragment: Cow::Borrowed(TOC_FRAGMENT),
        },
        PatchRule {
            name: "share",
            marker: ".article__share",
            anchor: ".article__content",
            mode: InsertMode::After,
            fragment: Cow::Owned(share_fragment(ctx)),
        },
        PatchRule {
            name: "related-posts",
            marker: ".related-posts",
            anchor: ".article__share",
            mode: InsertMode::After,
            fragment: Cow::Borrowed(RELATED_FRAGMENT),
        },
        PatchRule {
            name: "sidebar-toc",
            marker: ".article__sidebar",
            anchor: ".article__container",
            mode: InsertMode::Append,
            fragment: Cow::Borrowed(SIDEBAR_FRAGMENT),
        },
        PatchRule {
            name: "floating-toc-button",
            marker: ".floating-toc-btn",
            anchor: "article.article",
            mode: InsertMode::After,
            fragment: Cow::Borrowed(FLOATING_TOC_FRAGMENT),
        },
        PatchRule {
            name: "mobile-toc-modal",
            marker: ".mobile-toc-modal",
            anchor: ".floating-toc-btn",
            mode: InsertMode::After,
            fragment: Cow::Borrowed(MOBILE_TOC_FRAGMENT),
        },
        footer_rule(),
        script_rule("script:blog-loader", &REQUIRED_SCRIPTS[0]),
        script_rule("script:main", &REQUIRED_SCRIPTS[1]),
        script_rule("script:blog", &REQUIRED_SCRIPTS[2]),
        script_rule("script:article-template", &REQUIRED_SCRIPTS[3]),
        PatchRule {
            name: "head:favicon",
            marker: r#"link[rel="icon"]"#,
            anchor: "head",
            mode: InsertMode::Append,
            fragment: Cow::Borrowed(FAVICON_FRAGMENT),
        },
        PatchRule {
            name: "head:font-awesome",
            marker: r#"link[href*="font-awesome"]"#,
            anchor: "head",
            mode: InsertMode::Append,
            fragment: Cow::Borrowed(FONT_AWESOME_FRAGMENT),
        },
        PatchRule {
            name: "head:google-fonts",
            marker: r#"link[href*="fonts.googleapis.com/css2"]"#,
            anchor: "head",
            mode: InsertMode::Append,
            fragment: Cow::Borrowed(GOOGLE_FONTS_FRAGMENT),
        },
    ]
}
