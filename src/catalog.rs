//! Catalogs of the countries, categories, and languages the backend serves.
//!
//! The backend accepts arbitrary codes, so these lists are advisory: they
//! drive the `countries` and `categories` listings and let the client warn
//! about codes it has never heard of. Lookups go through [`once_cell`]-backed
//! index maps built on first use.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A country the backend aggregates news for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    /// Two-letter code, lowercase.
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

/// A category tag understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub tag: &'static str,
    pub label: &'static str,
}

/// A language articles are aggregated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Two-letter code, lowercase.
    pub code: &'static str,
    pub name: &'static str,
}

/// Countries with aggregated coverage.
pub const COUNTRIES: &[Country] = &[
    Country { code: "us", name: "United States", flag: "\u{1F1FA}\u{1F1F8}" },
    Country { code: "gb", name: "United Kingdom", flag: "\u{1F1EC}\u{1F1E7}" },
    Country { code: "ca", name: "Canada", flag: "\u{1F1E8}\u{1F1E6}" },
    Country { code: "au", name: "Australia", flag: "\u{1F1E6}\u{1F1FA}" },
    Country { code: "in", name: "India", flag: "\u{1F1EE}\u{1F1F3}" },
    Country { code: "de", name: "Germany", flag: "\u{1F1E9}\u{1F1EA}" },
    Country { code: "fr", name: "France", flag: "\u{1F1EB}\u{1F1F7}" },
    Country { code: "jp", name: "Japan", flag: "\u{1F1EF}\u{1F1F5}" },
];

/// Category tags the backend recognizes. Browsing with no category at all
/// ("all categories") is expressed by the absence of a tag, not a row here.
pub const CATEGORIES: &[Category] = &[
    Category { tag: "business", label: "Business" },
    Category { tag: "technology", label: "Technology" },
    Category { tag: "sports", label: "Sports" },
    Category { tag: "entertainment", label: "Entertainment" },
    Category { tag: "health", label: "Health" },
    Category { tag: "science", label: "Science" },
];

/// Languages with aggregated coverage.
pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
];

static COUNTRY_INDEX: Lazy<HashMap<&'static str, &'static Country>> =
    Lazy::new(|| COUNTRIES.iter().map(|c| (c.code, c)).collect());

static CATEGORY_INDEX: Lazy<HashMap<&'static str, &'static Category>> =
    Lazy::new(|| CATEGORIES.iter().map(|c| (c.tag, c)).collect());

static LANGUAGE_INDEX: Lazy<HashMap<&'static str, &'static Language>> =
    Lazy::new(|| LANGUAGES.iter().map(|l| (l.code, l)).collect());

/// Look up a country by its two-letter code.
pub fn country(code: &str) -> Option<&'static Country> {
    COUNTRY_INDEX.get(code).copied()
}

/// Look up a category by tag.
pub fn category(tag: &str) -> Option<&'static Category> {
    CATEGORY_INDEX.get(tag).copied()
}

/// Look up a language by its two-letter code.
pub fn language(code: &str) -> Option<&'static Language> {
    LANGUAGE_INDEX.get(code).copied()
}
