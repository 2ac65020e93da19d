//! Field extractors shared by the page parsers.
//!
//! Every helper is best-effort: a missing element, empty text or non-numeric text yields the
//! documented default (0, empty string, empty list or `None`) instead of an error.

use crate::model::{ChapterProgress, Page};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Numeric work id in a link (`/works/123`, relative or absolute).
pub(crate) static WORK_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/works/(\d+)").expect("work link pattern is valid"));
/// Numeric chapter id in a link.
pub(crate) static CHAPTER_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/chapters/(\d+)").expect("chapter link pattern is valid"));
/// User name segment in a link (`/users/name`, `/users/name/pseuds/p`).
pub(crate) static USER_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/users/([^/?#]+)").expect("user link pattern is valid"));
/// First integer in a text, separators included.
pub(crate) static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)").expect("integer pattern is valid"));

/// Compile a CSS selector. Selectors are constants, so failure is logged and treated as "no match".
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            debug!(selector = css, error = %e, "invalid selector");
            None
        }
    }
}

/// All descendants of `scope` matching `css`, in document order.
pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => scope.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// First descendant of `scope` matching `css`.
pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    scope.select(&sel).next()
}

/// Collapse internal runs of whitespace to a single space and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of an element, trimmed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match, or an empty string.
pub fn first_text(scope: ElementRef<'_>, css: &str) -> String {
    select_first(scope, css).map(element_text).unwrap_or_default()
}

/// Inner HTML of the first match (trimmed), or `None` when nothing matches.
pub fn first_inner_html(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select_first(scope, css).map(|el| el.inner_html().trim().to_string())
}

/// Parse a count the way the archive renders it: thousands separators stripped, leading digits
/// taken, anything else (including empty text) yields 0.
pub fn parse_count(text: &str) -> u64 {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Numeric stat from `dd.<field>` inside `scope`; 0 when missing or unparsable.
pub fn extract_stat(scope: ElementRef<'_>, field: &str) -> u64 {
    parse_count(&first_text(scope, &format!("dd.{}", field)))
}

/// The `dd` that follows the first `dt` whose text contains `label`.
pub fn labeled_value<'a>(scope: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    select_all(scope, "dt")
        .into_iter()
        .find(|term| normalize_whitespace(&term.text().collect::<String>()).contains(label))
        .and_then(|term| term.next_siblings().find_map(ElementRef::wrap))
        .filter(|value| value.value().name() == "dd")
}

/// Trimmed text of the value paired with `label`, or an empty string when the label is absent.
pub fn extract_labeled_text(scope: ElementRef<'_>, label: &str) -> String {
    labeled_value(scope, label)
        .map(element_text)
        .unwrap_or_default()
}

/// Whitespace-normalized text of every match, in document order. Blank matches are kept as "".
pub fn extract_tag_list(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    select_all(scope, css)
        .into_iter()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .collect()
}

/// Bare id from a prefixed identifier attribute (`work_123` -> `123`). Missing attribute -> "".
pub fn strip_prefix_id(value: Option<&str>, prefix: &str) -> String {
    match value {
        Some(v) => v.strip_prefix(prefix).unwrap_or(v).trim().to_string(),
        None => String::new(),
    }
}

/// First capture group of `re` in `text`.
pub fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Id captured by `pattern` from the `href` of the first link matching `css`.
pub fn href_id(scope: ElementRef<'_>, css: &str, pattern: &Regex) -> Option<String> {
    select_all(scope, css)
        .into_iter()
        .filter_map(|link| link.value().attr("href"))
        .find_map(|href| capture(pattern, href))
}

/// Split "posted/total" chapter text. `?` as total means unbounded. `None` when there is no `/`.
pub fn parse_chapter_progress(text: &str) -> Option<ChapterProgress> {
    let (posted, total) = text.split_once('/')?;
    let total = total.trim();
    Some(ChapterProgress {
        posted: to_u32(parse_count(posted)),
        total: if total == "?" {
            None
        } else {
            Some(to_u32(parse_count(total)))
        },
    })
}

/// Total count from the first heading matching any of `patterns` (tried in order per heading).
/// Each pattern must capture the number in group 1. Returns 0 when no heading matches.
pub fn heading_total(scope: ElementRef<'_>, heading_css: &str, patterns: &[Regex]) -> u64 {
    for heading in select_all(scope, heading_css) {
        let text = normalize_whitespace(&heading.text().collect::<String>());
        for pattern in patterns {
            if let Some(number) = capture(pattern, &text) {
                return parse_count(&number);
            }
        }
    }
    debug!(heading_css, "no heading carries a total count");
    0
}

/// Current and last page from the pagination control. Defaults to page 1 of 1.
pub fn parse_pagination(scope: ElementRef<'_>) -> Page {
    let current = select_first(scope, "ol.pagination .current")
        .map(|el| parse_count(&element_text(el)))
        .filter(|n| *n > 0)
        .map(to_u32)
        .unwrap_or(1);
    let last = select_all(scope, "ol.pagination a")
        .into_iter()
        .map(|link| to_u32(parse_count(&element_text(link))))
        .max()
        .map_or(1, |n| n.max(current));
    Page { current, last }
}

pub(crate) fn to_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn parse_count_strips_separators() {
        assert_eq!(parse_count("1,234"), 1234);
        assert_eq!(parse_count("  567 "), 567);
        assert_eq!(parse_count("5 kudos"), 5);
    }

    #[test]
    fn parse_count_defaults_to_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("invalid"), 0);
        assert_eq!(parse_count("not-a-number"), 0);
        assert_eq!(parse_count("-3"), 0);
    }

    #[test]
    fn extract_stat_missing_and_malformed() {
        let doc = Html::parse_document(
            r#"<dl class="stats"><dd class="words">1,000</dd><dd class="kudos">nope</dd></dl>"#,
        );
        let root = doc.root_element();
        assert_eq!(extract_stat(root, "words"), 1000);
        assert_eq!(extract_stat(root, "kudos"), 0);
        assert_eq!(extract_stat(root, "hits"), 0);
    }

    #[test]
    fn select_first_takes_document_order() {
        let doc = Html::parse_document(r#"<p class="a">one</p><p class="a">two</p>"#);
        let root = doc.root_element();
        assert_eq!(select_first(root, "p.a").map(element_text).as_deref(), Some("one"));
        assert!(select_first(root, "p.b").is_none());
        assert!(select_first(root, "p[").is_none());
    }

    #[test]
    fn labeled_text_finds_value_after_term() {
        let doc = Html::parse_document(
            r#"<dl class="meta">
                <dt>My user ID is:</dt><dd> 2457241 </dd>
                <dt>I joined on:</dt>
                <dd>2016-09-16</dd>
            </dl>"#,
        );
        let root = doc.root_element();
        assert_eq!(extract_labeled_text(root, "My user ID is:"), "2457241");
        assert_eq!(extract_labeled_text(root, "I joined on:"), "2016-09-16");
        assert_eq!(extract_labeled_text(root, "Location:"), "");
    }

    #[test]
    fn tag_list_normalizes_and_keeps_order() {
        let doc = Html::parse_document(
            r#"<ul><li><a class="tag">Alpha
                   Beta</a></li><li><a class="tag"> Gamma </a></li><li><a class="tag"> </a></li></ul>"#,
        );
        let tags = extract_tag_list(doc.root_element(), "a.tag");
        assert_eq!(
            tags,
            vec!["Alpha Beta".to_string(), "Gamma".to_string(), String::new()]
        );
        assert!(extract_tag_list(doc.root_element(), "a.missing").is_empty());
    }

    #[test]
    fn strip_prefix_id_handles_missing_attribute() {
        assert_eq!(strip_prefix_id(Some("work_123"), "work_"), "123");
        assert_eq!(strip_prefix_id(None, "work_"), "");
    }

    #[test]
    fn chapter_progress_unbounded_and_fixed() {
        assert_eq!(
            parse_chapter_progress("2/?"),
            Some(ChapterProgress {
                posted: 2,
                total: None
            })
        );
        assert_eq!(
            parse_chapter_progress(" 5 / 10 "),
            Some(ChapterProgress {
                posted: 5,
                total: Some(10)
            })
        );
        assert_eq!(parse_chapter_progress("5"), None);
    }

    #[test]
    fn pagination_defaults_and_reads_links() {
        let none = Html::parse_document("<p>no pagination</p>");
        assert_eq!(parse_pagination(none.root_element()), Page::default());

        let doc = Html::parse_document(
            r#"<ol class="pagination actions">
                <li class="previous"><a href="?page=1">&larr; Previous</a></li>
                <li><a href="?page=1">1</a></li>
                <li><span class="current">2</span></li>
                <li><a href="?page=3">3</a></li>
                <li><a href="?page=12">12</a></li>
                <li class="next"><a href="?page=3">Next &rarr;</a></li>
            </ol>"#,
        );
        assert_eq!(
            parse_pagination(doc.root_element()),
            Page {
                current: 2,
                last: 12
            }
        );
    }

    #[test]
    fn heading_total_first_match_wins() {
        let doc = Html::parse_document(
            r#"<h2 class="heading">Nothing here</h2>
               <h2 class="heading">1 - 20 of 1,234 Works in Test</h2>
               <h3 class="heading">99 Found</h3>"#,
        );
        let patterns = [
            Regex::new(r"of ([\d,]+) Works").unwrap(),
            Regex::new(r"^([\d,]+) Found").unwrap(),
        ];
        let total = heading_total(doc.root_element(), "h2.heading, h3.heading", &patterns);
        assert_eq!(total, 1234);
    }

    #[test]
    fn link_patterns_match_relative_and_absolute_hrefs() {
        assert_eq!(capture(&WORK_HREF, "/works/123?view_adult=true").as_deref(), Some("123"));
        assert_eq!(
            capture(&CHAPTER_HREF, "https://archiveofourown.org/works/1/chapters/77").as_deref(),
            Some("77")
        );
        assert_eq!(
            capture(&USER_HREF, "https://archiveofourown.org/users/reader/pseuds/r").as_deref(),
            Some("reader")
        );
        assert_eq!(capture(&FIRST_INTEGER, "Kudos: 1,024").as_deref(), Some("1,024"));
        assert_eq!(capture(&WORK_HREF, "/series/9"), None);
    }
}
