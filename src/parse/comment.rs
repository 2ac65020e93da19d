//! Comment listings and thread reconstruction.
//!
//! Parsing emits a flat, document-ordered list in which each comment records its parent (the
//! nearest enclosing comment element) and its depth. [`build_comment_threads`] then rebuilds the
//! tree from those parent ids.

use crate::model::{Comment, CommentResults};
use crate::parse::extract::{
    capture, heading_total, href_id, normalize_whitespace, parse_count, parse_pagination,
    select_all, selector, strip_prefix_id, CHAPTER_HREF, FIRST_INTEGER, USER_HREF, WORK_HREF,
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, trace};

const COMMENT_CSS: &str = r#".comment[id^="comment_"]"#;
const COMMENT_PREFIX: &str = "comment_";
static TOTAL_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"([\d,]+) Comments?").expect("comment total pattern is valid"),
        Regex::new(r"Comments \(([\d,]+)\)").expect("comment total pattern is valid"),
    ]
});

/// Work and chapter the listing was requested for. Used only when a comment has no link of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentContext<'a> {
    pub work_id: &'a str,
    pub chapter_id: Option<&'a str>,
}

/// Parse a comment page into threaded comments plus the heading total and pagination.
pub fn parse_comment_list(html: &str, ctx: CommentContext<'_>) -> CommentResults {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let flat = parse_comment_elements(root, ctx);
    let page = parse_pagination(root);
    CommentResults {
        comments: build_comment_threads(&flat),
        total: heading_total(root, "h2.heading, h3.heading", TOTAL_PATTERNS.as_slice()),
        page: page.current,
        total_pages: page.last,
    }
}

/// Parse every comment on the page, flat and in document order. `replies` is always empty.
pub fn parse_comments(html: &str, ctx: CommentContext<'_>) -> Vec<Comment> {
    let doc = Html::parse_document(html);
    parse_comment_elements(doc.root_element(), ctx)
}

fn parse_comment_elements(root: ElementRef<'_>, ctx: CommentContext<'_>) -> Vec<Comment> {
    let Some(comment_sel) = selector(COMMENT_CSS) else {
        return Vec::new();
    };
    let comments: Vec<Comment> = root
        .select(&comment_sel)
        .map(|el| parse_comment(el, &comment_sel, ctx))
        .collect();
    debug!(count = comments.len(), "parsed comments");
    comments
}

fn parse_comment(el: ElementRef<'_>, comment_sel: &Selector, ctx: CommentContext<'_>) -> Comment {
    let id = comment_id(el);
    // Enclosing comments, nearest first.
    let enclosing: Vec<ElementRef<'_>> = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|ancestor| comment_sel.matches(ancestor))
        .collect();
    let own = |css: &str| own_first(el, comment_sel, css);

    let (author, author_id, is_author_guest) = match own(".byline a") {
        Some(link) => (
            normalize_whitespace(&link.text().collect::<String>()),
            link.value()
                .attr("href")
                .and_then(|href| capture(&USER_HREF, href)),
            link.value().classes().any(|class| class == "guest"),
        ),
        None => (
            own(".byline")
                .and_then(|byline| byline.text().next().map(normalize_whitespace))
                .unwrap_or_default(),
            None,
            true,
        ),
    };

    let comment = Comment {
        work_id: href_id(el, r#"a[href*="/works/"]"#, &WORK_HREF)
            .unwrap_or_else(|| ctx.work_id.to_string()),
        chapter_id: href_id(el, r#"a[href*="/chapters/"]"#, &CHAPTER_HREF)
            .or_else(|| ctx.chapter_id.map(String::from)),
        author,
        author_id,
        is_author_guest,
        content: own(".userstuff")
            .map(|body| body.inner_html().trim().to_string())
            .unwrap_or_default(),
        posted: own(".datetime").map(own_text).unwrap_or_default(),
        edited: own(".edited").map(own_text),
        parent_id: enclosing.first().map(|parent| comment_id(*parent)),
        thread_id: enclosing
            .last()
            .map(|top| comment_id(*top))
            .unwrap_or_else(|| id.clone()),
        depth: u32::try_from(enclosing.len()).unwrap_or(u32::MAX),
        kudos: own(".kudos")
            .and_then(|kudos| capture(&FIRST_INTEGER, &own_text(kudos)))
            .map_or(0, |n| parse_count(&n)),
        replies: Vec::new(),
        id,
    };
    trace!(id = %comment.id, depth = comment.depth, "parsed comment");
    comment
}

fn comment_id(el: ElementRef<'_>) -> String {
    strip_prefix_id(el.value().attr("id"), COMMENT_PREFIX)
}

fn own_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

/// First descendant matching `css` that belongs to `comment` itself rather than a nested reply.
fn own_first<'a>(
    comment: ElementRef<'a>,
    comment_sel: &Selector,
    css: &str,
) -> Option<ElementRef<'a>> {
    select_all(comment, css).into_iter().find(|el| {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|ancestor| comment_sel.matches(ancestor))
            .is_some_and(|nearest| nearest.id() == comment.id())
    })
}

/// Rebuild comment threads from a flat list. Returns new root comments with `replies` filled in
/// transitively; the input is left untouched.
///
/// Pass one indexes every comment by id; pass two links each comment under its parent, or makes
/// it a root when it has no parent or the parent is not in the list. Each comment is placed
/// exactly once, so none appears both as a root and as a reply.
pub fn build_comment_threads(comments: &[Comment]) -> Vec<Comment> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    for (i, comment) in comments.iter().enumerate() {
        index.entry(comment.id.as_str()).or_insert(i);
    }

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (i, comment) in comments.iter().enumerate() {
        let parent = comment
            .parent_id
            .as_deref()
            .and_then(|parent_id| index.get(parent_id).copied())
            .filter(|&p| p != i);
        match parent {
            Some(p) => children.entry(p).or_default().push(i),
            None => roots.push(i),
        }
    }

    let mut placed = vec![false; comments.len()];
    roots
        .into_iter()
        .filter_map(|i| attach(i, comments, &children, &mut placed))
        .collect()
}

fn attach(
    i: usize,
    comments: &[Comment],
    children: &HashMap<usize, Vec<usize>>,
    placed: &mut [bool],
) -> Option<Comment> {
    if placed[i] {
        return None;
    }
    placed[i] = true;
    let mut node = comments[i].clone();
    node.replies = children
        .get(&i)
        .map(|kids| {
            kids.iter()
                .filter_map(|&k| attach(k, comments, children, placed))
                .collect()
        })
        .unwrap_or_default();
    Some(node)
}
