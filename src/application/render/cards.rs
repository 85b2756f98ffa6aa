//! Card, tab and table-of-contents fragments rendered through askama.

use super::{
    RenderError,
    toc::{HeadingLevel, TocEntry},
    views::CategoryPill,
};
use crate::{
    domain::{articles::ArticleRecord, articles::ArticleStore},
    presentation::views::{
        BlogCardView, BlogCardsTemplate, CategoryCardView, CategoryCardsTemplate, CategoryTabView,
        CategoryTabsTemplate, MobileTocTemplate, PlaceholderSvgTemplate, SidebarTocTemplate,
        SvgAttrView, SvgGradientView, SvgShapeView, TocItemView, render_template,
    },
    util::dates::{format_dotted_date, format_iso_date},
};

/// Inline placeholder artwork for a card; empty when the article has no icon.
pub fn placeholder_svg(article: &ArticleRecord) -> Result<String, RenderError> {
    let Some(icon) = &article.svg_icon else {
        return Ok(String::new());
    };

    let gradient = article.svg_gradient.as_ref().map(|gradient| {
        let [from, to] = gradient.colors.clone();
        SvgGradientView {
            id: gradient.id.clone(),
            from,
            to,
        }
    });
    let shapes = icon
        .elements
        .iter()
        .map(|shape| SvgShapeView {
            tag: shape.tag(),
            attrs: shape
                .attributes()
                .into_iter()
                .map(|(name, value)| SvgAttrView { name, value })
                .collect(),
        })
        .collect();

    Ok(render_template(PlaceholderSvgTemplate { gradient, shapes })?)
}

pub fn blog_card(article: &ArticleRecord, filterable: bool) -> Result<BlogCardView, RenderError> {
    Ok(BlogCardView {
        category: article.category.as_str().to_string(),
        category_label: article.category_label.clone(),
        path: article.path.clone(),
        title: article.title.clone(),
        excerpt: article.excerpt.clone(),
        iso_date: format_iso_date(article.date),
        display_date: format_dotted_date(article.date),
        placeholder_svg: placeholder_svg(article)?,
        filterable,
    })
}

pub fn render_blog_cards<'a>(
    articles: impl IntoIterator<Item = &'a ArticleRecord>,
    filterable: bool,
) -> Result<String, RenderError> {
    let cards = articles
        .into_iter()
        .map(|article| blog_card(article, filterable))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(render_template(BlogCardsTemplate { cards })?)
}

/// One card per category with its live article count.
pub fn render_category_cards(store: &ArticleStore) -> Result<String, RenderError> {
    let cards = store
        .categories
        .iter()
        .map(|def| CategoryCardView {
            id: def.id.as_str().to_string(),
            label: def.label.clone(),
            color: def.color.clone(),
            icon: def.icon.clone(),
            count: store.count_by_category(def.id),
        })
        .collect();
    Ok(render_template(CategoryCardsTemplate { cards })?)
}

pub fn render_category_tabs(pills: &[CategoryPill]) -> Result<String, RenderError> {
    let tabs = pills
        .iter()
        .map(|pill| CategoryTabView {
            filter: pill.filter.as_str().to_string(),
            label: pill.label.clone(),
            is_active: pill.is_active,
        })
        .collect();
    Ok(render_template(CategoryTabsTemplate { tabs })?)
}

fn toc_items(entries: &[TocEntry]) -> Vec<TocItemView> {
    entries
        .iter()
        .map(|entry| TocItemView {
            anchor: entry.anchor.clone(),
            label: entry.label.clone(),
            is_subsection: entry.level == HeadingLevel::H3,
        })
        .collect()
}

pub fn render_sidebar_toc(entries: &[TocEntry]) -> Result<String, RenderError> {
    Ok(render_template(SidebarTocTemplate {
        items: toc_items(entries),
    })?)
}

pub fn render_mobile_toc(entries: &[TocEntry]) -> Result<String, RenderError> {
    Ok(render_template(MobileTocTemplate {
        items: toc_items(entries),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        articles::fixtures::record,
        artwork::{gradient_for, icon_for},
        categories::CategoryId,
    };
    use time::macros::date;

    #[test]
    fn card_carries_display_date_and_artwork() {
        let mut article = record("a", date!(2025 - 01 - 05), CategoryId::Seo);
        article.svg_gradient = Some(gradient_for(CategoryId::Seo));
        article.svg_icon = Some(icon_for(CategoryId::Seo));

        let html = render_blog_cards([&article], true).expect("render");
        assert!(html.contains("2025.01.05"));
        assert!(html.contains(r#"<svg class="blog-card__placeholder""#));
        assert!(html.contains("linearGradient"));
        assert!(html.contains(r#"href="blog/posts/a.html""#));
    }

    #[test]
    fn card_without_icon_has_no_svg() {
        let article = record("a", date!(2025 - 01 - 05), CategoryId::Seo);
        assert_eq!(placeholder_svg(&article).expect("render"), "");
    }

    #[test]
    fn store_supplied_artwork_values_are_escaped() {
        let mut article = record("a", date!(2025 - 01 - 05), CategoryId::Seo);
        let mut gradient = gradient_for(CategoryId::Seo);
        gradient.colors[0] = r#"red"/><script>alert(1)</script>"#.to_string();
        article.svg_gradient = Some(gradient);
        let mut icon = icon_for(CategoryId::Seo);
        if let crate::domain::artwork::SvgShape::Path(path) = &mut icon.elements[1] {
            path.d = r#"M0 0"/><script>"#.to_string();
        }
        article.svg_icon = Some(icon);

        let svg = placeholder_svg(&article).expect("render");
        assert!(!svg.contains("<script>"));
        assert!(!svg.contains(r#""/><script"#));
        assert_eq!(svg.matches("&lt;script&gt;").count(), 2);
        assert!(svg.contains("stop-color:red&"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn category_cards_show_counts() {
        let store = ArticleStore::new(vec![
            record("a", date!(2025 - 01 - 01), CategoryId::Seo),
            record("b", date!(2025 - 01 - 02), CategoryId::Seo),
        ]);
        let html = render_category_cards(&store).expect("render");
        assert_eq!(html.matches(r#"class="category-card""#).count(), 7);
        assert!(html.contains("2件の記事"));
        assert!(html.contains(r#"href="blog/categories/web-production.html""#));
    }
}
