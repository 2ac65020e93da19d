//! Work listing pages: search results, tag pages, user works. Series pages reuse the blurb parser.

use crate::model::{SearchResults, WorkSummary};
use crate::parse::extract::{
    element_text, extract_stat, extract_tag_list, first_text, heading_total, select_all,
    select_first, strip_prefix_id,
};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::trace;

static TOTAL_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"of ([\d,]+) Works").expect("listing total pattern is valid"),
        Regex::new(r"^([\d,]+) Found").expect("listing total pattern is valid"),
    ]
});

/// Parse a work listing page into its blurbs and the total result count from the heading.
pub fn parse_work_list(html: &str) -> SearchResults {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let total_results = heading_total(root, "h2.heading, h3.heading", TOTAL_PATTERNS.as_slice());
    let works = select_all(root, "ol.work.index li.work")
        .into_iter()
        .map(parse_work_blurb)
        .collect();

    SearchResults {
        works,
        total_results,
    }
}

/// Parse one `li.work` blurb. Each field falls back independently (empty string, empty list, 0).
pub fn parse_work_blurb(item: ElementRef<'_>) -> WorkSummary {
    let summary = WorkSummary {
        id: strip_prefix_id(item.value().attr("id"), "work_"),
        title: first_text(item, "h4.heading a"),
        author: select_first(item, r#"a[rel="author"]"#)
            .map(element_text)
            .unwrap_or_default(),
        fandoms: extract_tag_list(item, "h5.fandoms a"),
        words: extract_stat(item, "words"),
        kudos: extract_stat(item, "kudos"),
        hits: extract_stat(item, "hits"),
    };
    trace!(id = %summary.id, title = %summary.title, "parsed work blurb");
    summary
}
