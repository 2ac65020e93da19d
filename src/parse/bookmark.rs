//! Bookmark listings (a user's bookmarks, or the bookmarks of one work).

use crate::model::{Bookmark, BookmarkResults, BookmarkSearchResult, BookmarkedWork};
use crate::parse::extract::{
    capture, element_text, extract_stat, extract_tag_list, first_inner_html, first_text,
    heading_total, href_id, normalize_whitespace, parse_chapter_progress, parse_pagination,
    select_all, select_first, strip_prefix_id, USER_HREF, WORK_HREF,
};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::trace;

static TOTAL_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"([\d,]+) Bookmarks").expect("bookmark total pattern is valid"),
        Regex::new(r"of ([\d,]+)").expect("bookmark total pattern is valid"),
    ]
});

/// Classes of the work-tag groups inside a blurb's tag list. Anything else there is a bookmark tag.
const WORK_TAG_CLASSES: [&str; 4] = ["warnings", "relationships", "characters", "freeforms"];

/// Parse a bookmark listing page: every bookmark, the total from the heading, and pagination.
pub fn parse_bookmark_list(html: &str) -> BookmarkResults {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let page = parse_pagination(root);
    BookmarkResults {
        bookmarks: select_all(root, "li.bookmark")
            .into_iter()
            .map(parse_bookmark_item)
            .collect(),
        total: heading_total(root, "h2.heading", TOTAL_PATTERNS.as_slice()),
        page: page.current,
        total_pages: page.last,
    }
}

/// Parse one `li.bookmark`: the bookmark record and the bookmarked work's blurb metadata.
pub fn parse_bookmark_item(item: ElementRef<'_>) -> BookmarkSearchResult {
    let work_link = select_first(item, r#"h4.heading a[href*="/works/"]"#);
    let work_title = work_link.map(element_text).unwrap_or_default();
    let work_author = select_first(item, r#"a[rel="author"]"#)
        .map(element_text)
        .unwrap_or_default();
    let user_link = select_first(item, r#".user a[href*="/users/"]"#);

    let bookmark = Bookmark {
        id: strip_prefix_id(item.value().attr("id"), "bookmark_"),
        work_id: work_link
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| capture(&WORK_HREF, href))
            .or_else(|| href_id(item, "a[href]", &WORK_HREF))
            .unwrap_or_default(),
        work_title: work_title.clone(),
        work_author: work_author.clone(),
        user_id: user_link
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| capture(&USER_HREF, href))
            .unwrap_or_default(),
        username: user_link.map(element_text).unwrap_or_default(),
        created: created_date(item),
        notes: select_first(item, ".notes blockquote, blockquote.notes")
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|note| !note.is_empty()),
        tags: bookmark_tags(item),
        public: select_first(item, ".private").is_none(),
        rec: select_first(item, ".rec").is_some(),
    };
    trace!(id = %bookmark.id, work_id = %bookmark.work_id, "parsed bookmark");

    let progress = parse_chapter_progress(&first_text(item, "dd.chapters"));
    let updated = first_text(item, ".header .datetime");
    let work = BookmarkedWork {
        title: work_title,
        author: work_author,
        summary: first_inner_html(item, "blockquote.summary").unwrap_or_default(),
        rating: normalize_whitespace(&first_text(item, ".rating")),
        warnings: extract_tag_list(item, "li.warnings a.tag"),
        categories: extract_tag_list(item, ".category .text")
            .iter()
            .flat_map(|text| text.split(','))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect(),
        fandoms: extract_tag_list(item, "h5.fandoms a"),
        relationships: extract_tag_list(item, "li.relationships a.tag"),
        characters: extract_tag_list(item, "li.characters a.tag"),
        additional_tags: extract_tag_list(item, "li.freeforms a.tag"),
        language: first_text(item, "dd.language"),
        published: first_text(item, "dd.published"),
        updated: if updated.is_empty() {
            None
        } else {
            Some(updated)
        },
        words: extract_stat(item, "words"),
        chapters: progress.unwrap_or_default(),
        completed: progress.map_or(true, |p| p.is_complete()),
        kudos: extract_stat(item, "kudos"),
        comments: extract_stat(item, "comments"),
        bookmarks: extract_stat(item, "bookmarks"),
        hits: extract_stat(item, "hits"),
    };

    BookmarkSearchResult { bookmark, work }
}

/// Bookmark date: the bookmarker module's date, else the first date outside the work header.
fn created_date(item: ElementRef<'_>) -> String {
    if let Some(el) = select_first(item, ".user .datetime") {
        return element_text(el);
    }
    select_all(item, ".datetime")
        .into_iter()
        .find(|el| !has_ancestor_class(*el, item, "header"))
        .map(element_text)
        .unwrap_or_default()
}

fn bookmark_tags(item: ElementRef<'_>) -> Vec<String> {
    select_all(item, "ul.tags > li")
        .into_iter()
        .filter(|li| {
            !li.value()
                .classes()
                .any(|class| WORK_TAG_CLASSES.contains(&class))
        })
        .flat_map(|li| extract_tag_list(li, "a.tag"))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// True when an element strictly between `el` and `scope` carries `class`.
fn has_ancestor_class(el: ElementRef<'_>, scope: ElementRef<'_>, class: &str) -> bool {
    el.ancestors()
        .take_while(|node| node.id() != scope.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().classes().any(|c| c == class))
}
