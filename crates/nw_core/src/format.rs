use crate::types::Article;

/// Telegram's cap on a text message, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

pub const UNKNOWN_SOURCE: &str = "Unknown source";
pub const UNKNOWN_DATE: &str = "Unknown date";

const ELLIPSIS: char = '…';

/// Renders an article as a Telegram HTML message.
///
/// Layout: bold title, `source · date`, snippet (omitted when empty), a blank
/// line, then the link. When the result would exceed [`MAX_MESSAGE_LEN`] the
/// snippet is shortened first; the link is never altered.
///
/// The title is kept whole whenever dropping the snippet is enough. Only a title
/// that cannot fit next to its link on its own (thousands of units once escaped)
/// is shortened, after the snippet is gone and the `source · date` line has
/// been cut as well.
pub fn format_article(article: &Article) -> String {
    let mut parts = Parts {
        title: escape_html(&article.title),
        meta: format!(
            "{} · {}",
            escape_html(article.source.as_deref().unwrap_or(UNKNOWN_SOURCE)),
            published_label(article)
        ),
        snippet: escape_html(&article.snippet),
    };
    let link = article.link.as_str();

    let mut message = parts.render(link);
    for field in [Field::Snippet, Field::Meta, Field::Title] {
        let excess = utf16_len(&message).saturating_sub(MAX_MESSAGE_LEN);
        if excess == 0 {
            break;
        }
        parts.shrink(field, excess);
        message = parts.render(link);
    }
    message
}

pub fn published_label(article: &Article) -> String {
    match article.published {
        Some(published) => published.format("%d %b %Y, %H:%M UTC").to_string(),
        None => UNKNOWN_DATE.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[derive(Clone, Copy)]
enum Field {
    Snippet,
    Meta,
    Title,
}

struct Parts {
    title: String,
    meta: String,
    snippet: String,
}

impl Parts {
    fn render(&self, link: &str) -> String {
        if self.snippet.is_empty() {
            format!("<b>{}</b>\n{}\n\n{}", self.title, self.meta, link)
        } else {
            format!(
                "<b>{}</b>\n{}\n{}\n\n{}",
                self.title, self.meta, self.snippet, link
            )
        }
    }

    fn shrink(&mut self, field: Field, excess: usize) {
        let text = match field {
            Field::Snippet => &mut self.snippet,
            Field::Meta => &mut self.meta,
            Field::Title => &mut self.title,
        };
        *text = truncate_with_ellipsis(text, excess);
    }
}

/// Drops at least `excess` UTF-16 units from the end of `text`, ellipsis included.
fn truncate_with_ellipsis(text: &str, excess: usize) -> String {
    let budget = utf16_len(text).saturating_sub(excess + ELLIPSIS.len_utf16());
    if budget == 0 {
        return String::new();
    }

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in text.char_indices() {
        if used + c.len_utf16() > budget {
            break;
        }
        used += c.len_utf16();
        end = idx + c.len_utf8();
    }

    let mut kept = &text[..end];
    // never leave half of an `&amp;`-style entity behind
    if let Some(amp) = kept.rfind('&') {
        if !kept[amp..].contains(';') {
            kept = &kept[..amp];
        }
    }

    let mut truncated = kept.trim_end().to_string();
    truncated.push(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawArticle;

    fn article(snippet: &str) -> Article {
        Article::normalize(&RawArticle {
            title: Some("Rates <held> & steady".to_string()),
            link: Some("https://example.com/rates?a=1&b=2".to_string()),
            published: Some("2024-03-01T10:30:00Z".to_string()),
            source: Some("Reuters".to_string()),
            snippet: Some(snippet.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_layout() {
        let message = format_article(&article("Central bank keeps rates."));
        assert_eq!(
            message,
            "<b>Rates &lt;held&gt; &amp; steady</b>\n\
             Reuters · 01 Mar 2024, 10:30 UTC\n\
             Central bank keeps rates.\n\
             \n\
             https://example.com/rates?a=1&b=2"
        );
    }

    #[test]
    fn test_sentinels_and_empty_snippet() {
        let mut item = article("");
        item.source = None;
        item.published = None;
        let message = format_article(&item);
        assert_eq!(
            message,
            "<b>Rates &lt;held&gt; &amp; steady</b>\n\
             Unknown source · Unknown date\n\
             \n\
             https://example.com/rates?a=1&b=2"
        );
    }

    #[test]
    fn test_long_snippet_is_truncated() {
        let item = article(&"word ".repeat(2000));
        let message = format_article(&item);
        assert!(utf16_len(&message) <= MAX_MESSAGE_LEN);
        assert!(message.ends_with(item.link.as_str()));
        assert!(message.starts_with("<b>Rates &lt;held&gt; &amp; steady</b>\n"));
        assert!(message.contains("…\n\nhttps://example.com/rates"));
    }

    #[test]
    fn test_truncation_counts_utf16_units() {
        let item = article(&"📰".repeat(3000));
        let message = format_article(&item);
        assert!(utf16_len(&message) <= MAX_MESSAGE_LEN);
        assert!(message.contains(item.link.as_str()));
    }

    #[test]
    fn test_truncation_keeps_entities_whole() {
        let cut = truncate_with_ellipsis("fish &amp; chips", 9);
        assert_eq!(cut, "fish…");
    }

    #[test]
    fn test_oversized_title_still_keeps_link() {
        let mut item = article("short");
        item.title = "T".repeat(5000);
        let message = format_article(&item);
        assert!(utf16_len(&message) <= MAX_MESSAGE_LEN);
        assert!(message.ends_with(item.link.as_str()));
    }

    #[test]
    fn test_long_title_survives_when_snippet_absorbs_excess() {
        let mut item = article(&"filler ".repeat(1000));
        item.title = "Headline & more ".repeat(100).trim_end().to_string();
        let message = format_article(&item);
        assert!(utf16_len(&message) <= MAX_MESSAGE_LEN);
        assert!(message.starts_with(&format!("<b>{}</b>\n", escape_html(&item.title))));
        assert!(message.contains("\nReuters · 01 Mar 2024, 10:30 UTC\n"));
        assert!(message.ends_with("…\n\nhttps://example.com/rates?a=1&b=2"));
    }

    #[test]
    fn test_title_shrinks_only_after_snippet_and_meta() {
        let mut item = article("gone first");
        item.title = "T".repeat(5000);
        let message = format_article(&item);
        assert_eq!(utf16_len(&message), MAX_MESSAGE_LEN);
        assert!(!message.contains("gone first"));
        assert!(!message.contains("Reuters"));
        assert!(message.starts_with("<b>TTT"));
        assert!(message.contains("…</b>\n"));
    }

    #[test]
    fn test_deterministic() {
        let item = article(&"x".repeat(5000));
        assert_eq!(format_article(&item), format_article(&item));
    }
}
