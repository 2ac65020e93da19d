//! Series page: metadata block, aggregate stats, and the works in series order.

use crate::model::{Series, SeriesStats};
use crate::parse::extract::{
    element_text, first_inner_html, first_text, labeled_value, parse_count, select_all,
    select_first,
};
use crate::parse::listing::parse_work_blurb;
use scraper::{ElementRef, Html};

/// Exact value the archive renders for a finished series.
const COMPLETE_YES: &str = "Yes";

/// Parse a series page. `series_id` is the id that was requested.
pub fn parse_series(html: &str, series_id: &str) -> Series {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let meta = select_first(root, "dl.series.meta");
    let value_text = |label: &str| {
        meta.and_then(|m| labeled_value(m, label))
            .map(element_text)
            .unwrap_or_default()
    };

    let authors: Vec<String> = meta
        .and_then(|m| labeled_value(m, "Creator"))
        .map(|dd| select_all(dd, "a").into_iter().map(element_text).collect())
        .unwrap_or_default();

    Series {
        id: series_id.to_string(),
        title: first_text(root, "h2.heading"),
        authors,
        description: markup_value(meta, "Description:")
            .or_else(|| first_inner_html(root, "div.series.meta.group > .userstuff")),
        notes: markup_value(meta, "Notes:")
            .or_else(|| first_inner_html(root, "div.series.meta.group .notes .userstuff")),
        stats: SeriesStats {
            words: parse_count(&value_text("Words:")),
            works: parse_count(&value_text("Works:")),
            complete: value_text("Complete") == COMPLETE_YES,
            bookmarks: parse_count(&value_text("Bookmarks:")),
        },
        works: select_all(root, "ul.series.work li.work")
            .into_iter()
            .map(parse_work_blurb)
            .collect(),
    }
}

fn markup_value(meta: Option<ElementRef<'_>>, label: &str) -> Option<String> {
    meta.and_then(|m| labeled_value(m, label))
        .and_then(|dd| first_inner_html(dd, ".userstuff"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES_PAGE: &str = r#"<html><body><div id="main" class="series-show region">
  <h2 class="heading">if I was with you I could say amen.</h2>
  <div class="wrapper">
    <dl class="series meta group">
      <dt>Creator:</dt>
      <dd><a rel="author" href="/users/TheHomelyBadger/pseuds/TheHomelyBadger">TheHomelyBadger</a></dd>
      <dt>Series Begun:</dt><dd>2023-07-01</dd>
      <dt>Description:</dt>
      <dd><blockquote class="userstuff"><p>A series.</p></blockquote></dd>
      <dt>Stats:</dt>
      <dd><dl class="stats">
        <dt>Words:</dt><dd>23,456</dd>
        <dt>Works:</dt><dd>3</dd>
        <dt>Complete:</dt><dd>Yes</dd>
        <dt>Bookmarks:</dt><dd>1,001</dd>
      </dl></dd>
    </dl>
  </div>
  <ul class="series work index group">
    <li id="work_1" class="work blurb group"><h4 class="heading"><a href="/works/1">One</a></h4></li>
    <li id="work_2" class="work blurb group"><h4 class="heading"><a href="/works/2">Two</a></h4></li>
    <li id="work_3" class="work blurb group"><h4 class="heading"><a href="/works/3">Three</a></h4></li>
  </ul>
</div></body></html>"#;

    #[test]
    fn series_metadata_stats_and_works() {
        let series = parse_series(SERIES_PAGE, "4001494");
        assert_eq!(series.id, "4001494");
        assert_eq!(series.title, "if I was with you I could say amen.");
        assert_eq!(series.authors, vec!["TheHomelyBadger".to_string()]);
        assert_eq!(series.description.as_deref(), Some("<p>A series.</p>"));
        assert_eq!(series.notes, None);
        assert_eq!(
            series.stats,
            SeriesStats {
                words: 23456,
                works: 3,
                complete: true,
                bookmarks: 1001
            }
        );
        let ids: Vec<&str> = series.works.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(series.works[1].title, "Two");
    }

    #[test]
    fn complete_requires_exact_yes() {
        let html = r#"<h2 class="heading">S</h2><dl class="series meta">
            <dt>Complete:</dt><dd>No</dd></dl>"#;
        assert!(!parse_series(html, "1").stats.complete);

        let html = r#"<dl class="series meta"><dt>Complete?</dt><dd>Yes</dd></dl>"#;
        assert!(parse_series(html, "1").stats.complete);
    }

    #[test]
    fn bare_page_degrades_to_defaults() {
        let series = parse_series("<html><body></body></html>", "7");
        assert_eq!(series.id, "7");
        assert!(series.authors.is_empty());
        assert!(series.works.is_empty());
        assert_eq!(series.description, None);
        assert_eq!(series.stats, SeriesStats::default());
    }
}
