use askama::{Error as AskamaError, Template};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }

    /// Module path of the call site that failed to render.
    pub fn origin(&self) -> &'static str {
        self.source
    }
}

pub fn render_template<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

#[derive(Clone)]
pub struct BlogCardView {
    pub category: String,
    pub category_label: String,
    pub path: String,
    pub title: String,
    pub excerpt: String,
    pub iso_date: String,
    pub display_date: String,
    /// Pre-rendered `<svg>` placeholder; empty when the article has no artwork.
    pub placeholder_svg: String,
    /// Emit `data-category` so the card can take part in grid filtering.
    pub filterable: bool,
}

#[derive(Template)]
#[template(path = "render/blog_cards.html")]
pub struct BlogCardsTemplate {
    pub cards: Vec<BlogCardView>,
}

#[derive(Clone)]
pub struct SvgGradientView {
    pub id: String,
    pub from: String,
    pub to: String,
}

#[derive(Clone)]
pub struct SvgAttrView {
    pub name: &'static str,
    pub value: String,
}

#[derive(Clone)]
pub struct SvgShapeView {
    pub tag: &'static str,
    pub attrs: Vec<SvgAttrView>,
}

/// Card placeholder artwork. Store-supplied values are attribute-escaped.
#[derive(Template)]
#[template(path = "render/placeholder_svg.html")]
pub struct PlaceholderSvgTemplate {
    pub gradient: Option<SvgGradientView>,
    pub shapes: Vec<SvgShapeView>,
}

#[derive(Clone)]
pub struct CategoryCardView {
    pub id: String,
    pub label: String,
    pub color: String,
    pub icon: String,
    pub count: usize,
}

#[derive(Template)]
#[template(path = "render/category_cards.html")]
pub struct CategoryCardsTemplate {
    pub cards: Vec<CategoryCardView>,
}

#[derive(Clone)]
pub struct CategoryTabView {
    pub filter: String,
    pub label: String,
    pub is_active: bool,
}

#[derive(Template)]
#[template(path = "render/category_tabs.html")]
pub struct CategoryTabsTemplate {
    pub tabs: Vec<CategoryTabView>,
}

#[derive(Clone)]
pub struct TocItemView {
    pub anchor: String,
    pub label: String,
    pub is_subsection: bool,
}

#[derive(Template)]
#[template(path = "render/sidebar_toc.html")]
pub struct SidebarTocTemplate {
    pub items: Vec<TocItemView>,
}

#[derive(Template)]
#[template(path = "render/mobile_toc.html")]
pub struct MobileTocTemplate {
    pub items: Vec<TocItemView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str) -> BlogCardView {
        BlogCardView {
            category: "seo".to_string(),
            category_label: "SEO".to_string(),
            path: "blog/posts/a.html".to_string(),
            title: title.to_string(),
            excerpt: "抜粋".to_string(),
            iso_date: "2025-01-05".to_string(),
            display_date: "2025.01.05".to_string(),
            placeholder_svg: String::new(),
            filterable: true,
        }
    }

    #[test]
    fn blog_card_escapes_text_fields() {
        let html = render_template(BlogCardsTemplate {
            cards: vec![card("A & <B>")],
        })
        .expect("render");
        assert!(html.contains("A &amp; &lt;B&gt;"));
        assert!(html.contains(r#"data-category="seo""#));
        assert!(html.contains(r#"<time class="blog-card__date" datetime="2025-01-05">2025.01.05</time>"#));
    }

    #[test]
    fn non_filterable_card_omits_category_attribute() {
        let mut view = card("A");
        view.filterable = false;
        let html = render_template(BlogCardsTemplate { cards: vec![view] }).expect("render");
        assert!(!html.contains("data-category"));
    }

    #[test]
    fn category_tabs_mark_active_filter() {
        let html = render_template(CategoryTabsTemplate {
            tabs: vec![
                CategoryTabView {
                    filter: "all".to_string(),
                    label: "すべて".to_string(),
                    is_active: true,
                },
                CategoryTabView {
                    filter: "seo".to_string(),
                    label: "SEO".to_string(),
                    is_active: false,
                },
            ],
        })
        .expect("render");
        assert!(html.contains(r#"<button class="blog-category-tab active" data-category="all">すべて</button>"#));
        assert!(html.contains(r#"<button class="blog-category-tab" data-category="seo">SEO</button>"#));
    }
}
