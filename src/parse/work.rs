//! Work pages: full work metadata, the chapter index, and single chapter content.

use crate::model::{Chapter, ChapterContent, Work, WorkStats, WorkTags};
use crate::parse::extract::{
    capture, element_text, extract_stat, extract_tag_list, first_inner_html, first_text,
    normalize_whitespace, parse_chapter_progress, select_all, select_first,
};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::debug;

static CHAPTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\d+\.\s*(.*)$").expect("chapter number pattern is valid"));

/// Parse a work page (`/works/{id}?view_full_work=true`). `work_id` is the id that was requested.
pub fn parse_work(html: &str, work_id: &str) -> Work {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let stats = select_first(root, "dl.stats");
    let stat_text = |field: &str| {
        stats
            .map(|s| first_text(s, &format!("dd.{}", field)))
            .unwrap_or_default()
    };
    let stat_count = |field: &str| stats.map(|s| extract_stat(s, field)).unwrap_or(0);
    let updated = stat_text("updated");

    Work {
        id: work_id.to_string(),
        title: work_title(root),
        author: select_first(root, r#"a[rel="author"]"#)
            .map(element_text)
            .unwrap_or_default(),
        summary: first_inner_html(root, ".summary .userstuff").unwrap_or_default(),
        language: first_text(root, "dd.language"),
        stats: WorkStats {
            published: stat_text("published"),
            updated: if updated.is_empty() {
                None
            } else {
                Some(updated)
            },
            words: stat_count("words"),
            chapters: parse_chapter_progress(&stat_text("chapters")).unwrap_or_default(),
            hits: stat_count("hits"),
        },
        tags: parse_work_tags(root),
    }
}

fn parse_work_tags(root: ElementRef<'_>) -> WorkTags {
    WorkTags {
        rating: extract_tag_list(root, "dd.rating a.tag").join(", "),
        warnings: extract_tag_list(root, "dd.warning a.tag"),
        category: extract_tag_list(root, "dd.category a.tag"),
        fandoms: extract_tag_list(root, "dd.fandom a.tag"),
        relationships: extract_tag_list(root, "dd.relationship a.tag"),
        characters: extract_tag_list(root, "dd.character a.tag"),
        freeforms: extract_tag_list(root, "dd.freeform a.tag"),
    }
}

fn work_title(root: ElementRef<'_>) -> String {
    normalize_whitespace(&first_text(root, "h2.title.heading"))
}

/// Parse the chapter index of a work page.
///
/// Each option of the chapter selector becomes one chapter with its "N. " prefix stripped. A work
/// without a selector is a single-chapter work: one chapter whose id is the work id and whose
/// title is the work title.
pub fn parse_chapters(html: &str, work_id: &str) -> Vec<Chapter> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let options = select_all(root, "#chapter_index select option");
    if options.is_empty() {
        debug!(work_id, "no chapter index; treating as single-chapter work");
        return vec![Chapter {
            id: work_id.to_string(),
            title: work_title(root),
        }];
    }

    options
        .into_iter()
        .map(|option| Chapter {
            id: option.value().attr("value").unwrap_or_default().to_string(),
            title: strip_chapter_number(&element_text(option)),
        })
        .collect()
}

fn strip_chapter_number(text: &str) -> String {
    capture(&CHAPTER_NUMBER, text)
        .map(|rest| rest.trim().to_string())
        .unwrap_or_else(|| text.to_string())
}

/// Parse one chapter page. Ids are the ones that were requested.
///
/// Summary, notes and end notes are `None` when their container or its inner blockquote is
/// missing. The body is taken from the article container and is empty, not `None`, when absent.
pub fn parse_chapter_content(html: &str, work_id: &str, chapter_id: &str) -> ChapterContent {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let content = first_inner_html(root, r#"div.userstuff[role="article"]"#).unwrap_or_else(|| {
        debug!(work_id, chapter_id, "chapter page has no article container");
        String::new()
    });

    ChapterContent {
        work_id: work_id.to_string(),
        chapter_id: chapter_id.to_string(),
        title: normalize_whitespace(&first_text(root, "h3.title")),
        summary: blockquote_html(root, "#summary"),
        notes: blockquote_html(root, "div#notes"),
        content,
        end_notes: blockquote_html(root, "div.end.notes"),
    }
}

fn blockquote_html(root: ElementRef<'_>, container: &str) -> Option<String> {
    select_first(root, container).and_then(|c| first_inner_html(c, "blockquote.userstuff"))
}
