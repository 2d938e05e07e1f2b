//! JSON output for piping article lists into other tools.
//!
//! The serialization reuses the wire-format field names (`_id`, `pubDate`),
//! so downstream consumers see the same shape the backend serves.

use crate::models::Article;

/// Serialize an article list as pretty-printed JSON.
pub fn render_articles(articles: &[Article]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_articles_uses_wire_field_names() {
        let articles = vec![Article {
            id: "a1".to_string(),
            title: "Story".to_string(),
            description: None,
            link: "https://example.com/a1".to_string(),
            image_url: None,
            source_id: None,
            category: vec!["science".to_string()],
            pub_date: Some("2024-01-15 10:30:00".to_string()),
        }];

        let json = render_articles(&articles).unwrap();
        assert!(json.contains("\"_id\": \"a1\""));
        assert!(json.contains("\"pubDate\": \"2024-01-15 10:30:00\""));
    }

    #[test]
    fn test_render_articles_empty_list() {
        assert_eq!(render_articles(&[]).unwrap(), "[]");
    }
}
