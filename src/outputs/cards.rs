//! Text-card rendering of browser views.
//!
//! One render covers the four mutually exclusive view states: a loading
//! notice, an error panel, an empty-feed notice, or the article grid. The
//! grid shows one numbered card per article with the same fallbacks a
//! reader would see in any news UI: a stand-in description, a generic
//! source, and `N/A` for unparseable dates.

use itertools::Itertools;
use std::fmt::Write;

use crate::browser::{BrowserView, ViewState};
use crate::catalog;
use crate::models::{Article, NewsFilters};
use crate::utils::{ellipsize, format_date};

/// Shown while a fetch cycle is running.
const LOADING_TEXT: &str = "Fetching news...";

/// Shown when a completed cycle found nothing.
const EMPTY_TEXT: &str = "No news articles found for this selection.";

/// Description stand-in for articles without one.
const FALLBACK_DESCRIPTION: &str = "Click to read the full story on the original source.";

/// Source stand-in for articles without one.
const FALLBACK_SOURCE: &str = "Global News";

/// Category badge for untagged articles.
const FALLBACK_CATEGORY: &str = "GENERAL";

/// Card descriptions are cut to this many characters.
const DESCRIPTION_WIDTH: usize = 100;

/// Render a complete view: filter header plus state panel or grid.
pub fn render_view(view: &BrowserView) -> String {
    let mut out = String::new();
    writeln!(out, "{}", header(&view.filters)).unwrap();

    match &view.state {
        ViewState::Loading => writeln!(out, "\n{LOADING_TEXT}").unwrap(),
        ViewState::Error(message) => writeln!(out, "\n✗ {message}").unwrap(),
        ViewState::Empty => writeln!(out, "\n{EMPTY_TEXT}").unwrap(),
        ViewState::Grid(articles) => {
            for (idx, article) in articles.iter().enumerate() {
                out.push('\n');
                render_card(&mut out, idx + 1, article);
            }
            if let Some(total) = view.total_pages {
                writeln!(out, "\npage {} of {}", view.filters.page, total).unwrap();
            }
        }
    }
    out
}

/// One line summarizing the active filters, e.g.
/// `United States 🇺🇸 · Technology · lang en · page 2`.
fn header(filters: &NewsFilters) -> String {
    let country = match catalog::country(&filters.country) {
        Some(c) => format!("{} {}", c.name, c.flag),
        None => filters.country.to_uppercase(),
    };
    let category = match &filters.category {
        Some(tag) => catalog::category(tag)
            .map(|c| c.label.to_string())
            .unwrap_or_else(|| tag.clone()),
        None => "All Categories".to_string(),
    };

    let mut parts = vec![country, category, format!("lang {}", filters.language)];
    if let Some(start) = filters.start_date {
        parts.push(format!("from {start}"));
    }
    if let Some(end) = filters.end_date {
        parts.push(format!("to {end}"));
    }
    parts.push(format!("page {}", filters.page));
    parts.iter().join(" · ")
}

fn render_card(out: &mut String, number: usize, article: &Article) {
    let badge = article
        .category
        .first()
        .map(|tag| tag.to_uppercase())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
    writeln!(out, "{number:>2}. {}  [{badge}]", article.title).unwrap();

    let description = article
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(FALLBACK_DESCRIPTION);
    writeln!(out, "    {}", ellipsize(description, DESCRIPTION_WIDTH)).unwrap();

    let source = article
        .source_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(FALLBACK_SOURCE);
    writeln!(
        out,
        "    {source} · {}",
        format_date(article.published_at())
    )
    .unwrap();

    if !article.link.is_empty() {
        writeln!(out, "    {}", article.link).unwrap();
    }
}

/// Listing of the known country catalog.
pub fn render_countries() -> String {
    let mut out = String::new();
    writeln!(out, "Known countries:").unwrap();
    for c in catalog::COUNTRIES {
        writeln!(out, "  {}  {} {}", c.code, c.flag, c.name).unwrap();
    }
    out
}

/// One-line listing of the known category tags.
pub fn render_categories() -> String {
    let tags = catalog::CATEGORIES.iter().map(|c| c.tag).join(", ");
    format!("Known categories: all, {tags}\n")
}
