//! Page-type detection from a request path.

use crate::domain::categories::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// Site top page with the latest-articles strip.
    Home,
    /// `/blog/index.html`: every article plus category cards.
    Index,
    /// `/blog/categories/<id>.html`.
    Category(CategoryId),
    /// `/<posts prefix>/<id>.html`, `/blog/posts/<id>.html` by default.
    Article(String),
    Other,
}

impl PageKind {
    /// Classify `path` as served under `base_href` (for example
    /// `/yojitsu-website/`), with article pages living under `posts_prefix`
    /// relative to the site root. Paths are matched by substring so that
    /// the same rules hold with or without the base prefix.
    pub fn from_path(path: &str, base_href: &str, posts_prefix: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);

        if path.contains("/blog/index.html") || path == "blog/index.html" {
            return Self::Index;
        }

        if let Some(rest) = after_segment(path, "blog/categories/") {
            return html_stem(rest)
                .and_then(|stem| stem.parse::<CategoryId>().ok())
                .map(Self::Category)
                .unwrap_or(Self::Other);
        }

        let posts_prefix = posts_prefix.trim_matches('/');
        if !posts_prefix.is_empty() {
            if let Some(rest) = after_segment(path, &format!("/{posts_prefix}/")) {
                return html_stem(rest)
                    .map(|stem| Self::Article(stem.to_string()))
                    .unwrap_or(Self::Other);
            }
        }

        let root = base_href.trim_end_matches('/');
        if path.is_empty()
            || path == "/"
            || path.ends_with('/')
            || path.ends_with("index.html")
            || (!root.is_empty() && path == root)
        {
            return Self::Home;
        }

        Self::Other
    }
}

fn after_segment<'a>(path: &'a str, segment: &str) -> Option<&'a str> {
    path.find(segment).map(|index| &path[index + segment.len()..])
}

fn html_stem(rest: &str) -> Option<&str> {
    let stem = rest.strip_suffix(".html")?;
    (!stem.is_empty() && !stem.contains('/')).then_some(stem)
}
