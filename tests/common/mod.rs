#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

/// A complete article page as the blog publishes it.
pub fn article_page(title: &str, badge: &str, date: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <base href="/yojitsu-website/">
    <meta charset="UTF-8">
    <title>{title} | 余日（ヨジツ）ブログ</title>
    <meta name="description" content="{description}">
    <meta name="keywords" content="マーケティング,ブログ">
    <script type="application/ld+json">
    {{"@context":"https://schema.org","@type":"BlogPosting","headline":"{title}","datePublished":"{date}T09:00:00+09:00"}}
    </script>
</head>
<body>
    <nav class="breadcrumb"></nav>
    <article class="article">
        <div class="article__container">
            <div class="article__main">
                <header class="article__header">
                    <div class="article__meta">
                        <span class="article__category">{badge}</span>
                        <time datetime="{date}">{date}</time>
                    </div>
                    <h1 class="article__title">{title}</h1>
                    <p class="article__excerpt">{description}</p>
                </header>
                <div class="article__featured-image"></div>
                <div class="article__content">
                    <h2>1. はじめに</h2>
                    <p>本文です。<a href="https://developers.google.com/search">公式ドキュメント</a></p>
                    <h3>ポイント</h3>
                    <h2>2. まとめ</h2>
                </div>
            </div>
        </div>
    </article>
</body>
</html>
"#
    )
}

pub struct SiteTree {
    pub dir: TempDir,
}

impl SiteTree {
    /// Three articles: two SEO (newest and oldest) and one ads article.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let posts = dir.path().join("blog/posts");
        fs::create_dir_all(&posts).expect("posts dir");

        fs::write(
            posts.join("seo-basics.html"),
            article_page("SEOの基本", "SEO", "2025-01-01", "SEOの基礎を解説します"),
        )
        .expect("write seo-basics");
        fs::write(
            posts.join("seo-advanced.html"),
            article_page("SEOの応用", "SEO", "2025-01-05", "内部対策の応用編"),
        )
        .expect("write seo-advanced");
        fs::write(
            posts.join("listing-ads.html"),
            article_page("リスティング広告入門", "広告運用", "2025-01-03", "広告運用の第一歩"),
        )
        .expect("write listing-ads");

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root().join("blog/posts")
    }

    pub fn store_path(&self) -> PathBuf {
        self.root().join("blog/articles.json")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).expect("read site file")
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(path, contents).expect("write site file");
    }
}
