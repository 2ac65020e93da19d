//! Typed data model for parsed archive pages.
//!
//! Every value is produced fresh by a single parse call. List fields are never absent (empty
//! instead), counts default to 0, and optional markup fields use `None` for "element absent"
//! and `Some("")` for "element present but empty".

use serde::{Deserialize, Serialize};

/// One blurb on a work listing page (search results, tag pages, series, user works).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    /// Bare numeric id (`work_123` -> `123`); empty when the blurb has no id attribute.
    pub id: String,
    pub title: String,
    pub author: String,
    pub fandoms: Vec<String>,
    pub words: u64,
    pub kudos: u64,
    pub hits: u64,
}

/// One page of works plus the total result count read from the page heading.
///
/// `total_results` is the size of the whole result set and may be larger than `works.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub works: Vec<WorkSummary>,
    pub total_results: u64,
}

/// Posted chapters out of the planned total. `total` is `None` when the archive shows `?`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterProgress {
    pub posted: u32,
    pub total: Option<u32>,
}

impl ChapterProgress {
    /// True when the total is known and every planned chapter is posted.
    pub fn is_complete(&self) -> bool {
        self.total == Some(self.posted)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkStats {
    /// Date text exactly as rendered by the archive.
    pub published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    pub words: u64,
    pub chapters: ChapterProgress,
    pub hits: u64,
}

/// Tag sets of a work, each in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTags {
    pub rating: String,
    pub warnings: Vec<String>,
    pub category: Vec<String>,
    pub fandoms: Vec<String>,
    pub relationships: Vec<String>,
    pub characters: Vec<String>,
    pub freeforms: Vec<String>,
}

/// Full information about a work, from its main page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Inner HTML of the summary block; empty when the work has none.
    pub summary: String,
    pub language: String,
    pub stats: WorkStats,
    pub tags: WorkTags,
}

/// One entry of a work's chapter index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
}

/// Content of a single chapter. Markup fields carry inner HTML, not plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    pub work_id: String,
    pub chapter_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub notes: Option<String>,
    /// Chapter body. Empty (never `None`) when the article container is missing.
    pub content: String,
    pub end_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub words: u64,
    pub works: u64,
    pub complete: bool,
    pub bookmarks: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Caller-supplied; series pages do not render their own id reliably.
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub stats: SeriesStats,
    pub works: Vec<WorkSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Username as rendered by the archive (may differ in case from the one requested).
    pub username: String,
    pub user_id: String,
    pub joined: String,
    /// `None` when the profile has no bio module at all.
    pub bio_html: Option<String>,
}

/// A bookmark record as shown on a bookmark listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub work_id: String,
    pub work_title: String,
    pub work_author: String,
    pub user_id: String,
    pub username: String,
    pub created: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub public: bool,
    pub rec: bool,
}

/// Snapshot of the bookmarked work's blurb metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedWork {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub rating: String,
    pub warnings: Vec<String>,
    pub categories: Vec<String>,
    pub fandoms: Vec<String>,
    pub relationships: Vec<String>,
    pub characters: Vec<String>,
    pub additional_tags: Vec<String>,
    pub language: String,
    pub published: String,
    pub updated: Option<String>,
    pub words: u64,
    pub chapters: ChapterProgress,
    pub completed: bool,
    pub kudos: u64,
    pub comments: u64,
    pub bookmarks: u64,
    pub hits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkSearchResult {
    pub bookmark: Bookmark,
    pub work: BookmarkedWork,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResults {
    pub bookmarks: Vec<BookmarkSearchResult>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

/// One comment. `replies` is empty straight out of the parser and is only filled by
/// [`build_comment_threads`](crate::parse::build_comment_threads).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub work_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub is_author_guest: bool,
    /// Inner HTML of the comment body.
    pub content: String,
    pub posted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub thread_id: String,
    /// Number of enclosing comments; 0 for a top-level comment.
    pub depth: u32,
    pub kudos: u64,
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResults {
    /// Root comments with replies attached.
    pub comments: Vec<Comment>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

/// Current and last page number of a paginated listing. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub current: u32,
    pub last: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            current: 1,
            last: 1,
        }
    }
}
