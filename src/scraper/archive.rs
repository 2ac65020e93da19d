//! Archive operations: one page request each, status-checked, then handed to the matching parser.

use crate::model::{
    BookmarkResults, Chapter, ChapterContent, CommentResults, SearchResults, Series, UserProfile,
    Work,
};
use crate::parse::{self, CommentContext};
use crate::scraper::client::ArchiveClient;
use crate::scraper::error::ScraperError;
use crate::scraper::search::{escape_tag, SearchOptions};
use tracing::info;

fn full_work_query() -> Vec<(&'static str, String)> {
    vec![
        ("view_adult", "true".to_string()),
        ("view_full_work", "true".to_string()),
    ]
}

fn page_query(page: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.max(1).to_string())]
}

fn comments_query(page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("show_comments", "true".to_string()),
        ("view_adult", "true".to_string()),
        ("page", page.max(1).to_string()),
    ]
}

impl ArchiveClient {
    /// Work metadata, tags and stats. Adult-content interstitials are skipped.
    pub fn get_work(&self, work_id: &str) -> Result<Work, ScraperError> {
        let url = self.endpoint(&["works", work_id], &full_work_query())?;
        let html = self.fetch_html(url, &format!("work {}", work_id))?;
        let work = parse::parse_work(&html, work_id);
        info!(work_id, title = %work.title, "fetched work");
        Ok(work)
    }

    /// Chapter index of a work; a single-chapter work yields one entry keyed by the work id.
    pub fn get_chapters(&self, work_id: &str) -> Result<Vec<Chapter>, ScraperError> {
        let url = self.endpoint(&["works", work_id], &full_work_query())?;
        let html = self.fetch_html(url, &format!("chapters for work {}", work_id))?;
        let chapters = parse::parse_chapters(&html, work_id);
        info!(work_id, count = chapters.len(), "fetched chapter index");
        Ok(chapters)
    }

    pub fn get_chapter_content(
        &self,
        work_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterContent, ScraperError> {
        let url = self.endpoint(
            &["works", work_id, "chapters", chapter_id],
            &[("view_adult", "true".to_string())],
        )?;
        let html = self.fetch_html(url, &format!("chapter {} of work {}", chapter_id, work_id))?;
        Ok(parse::parse_chapter_content(&html, work_id, chapter_id))
    }

    pub fn get_series(&self, series_id: &str) -> Result<Series, ScraperError> {
        let url = self.endpoint(&["series", series_id], &[])?;
        let html = self.fetch_html(url, &format!("series {}", series_id))?;
        let series = parse::parse_series(&html, series_id);
        info!(series_id, works = series.works.len(), "fetched series");
        Ok(series)
    }

    pub fn get_user_profile(&self, username: &str) -> Result<UserProfile, ScraperError> {
        let url = self.endpoint(&["users", username, "profile"], &[])?;
        let html = self.fetch_html(url, &format!("profile for user {}", username))?;
        Ok(parse::parse_user_profile(&html))
    }

    /// One page of a user's works. Pages start at 1; 0 is treated as 1.
    pub fn get_user_works(&self, username: &str, page: u32) -> Result<SearchResults, ScraperError> {
        let url = self.endpoint(&["users", username, "works"], &page_query(page))?;
        let html = self.fetch_html(url, &format!("works for user {}", username))?;
        Ok(parse::parse_work_list(&html))
    }

    pub fn search(&self, options: &SearchOptions) -> Result<SearchResults, ScraperError> {
        let url = self.endpoint(&["works", "search"], &options.to_query_pairs())?;
        let html = self.fetch_html(url, "search results")?;
        let results = parse::parse_work_list(&html);
        info!(
            total = results.total_results,
            returned = results.works.len(),
            "search finished"
        );
        Ok(results)
    }

    /// One page of works filed under `tag`. The tag is escaped with the archive's tag-path
    /// convention before percent-encoding.
    pub fn get_tag_works(&self, tag: &str, page: u32) -> Result<SearchResults, ScraperError> {
        let escaped = escape_tag(tag);
        let url = self.endpoint(&["tags", &escaped, "works"], &page_query(page))?;
        let html = self.fetch_html(url, &format!("works for tag {}", tag))?;
        Ok(parse::parse_work_list(&html))
    }

    pub fn get_user_bookmarks(
        &self,
        username: &str,
        page: u32,
    ) -> Result<BookmarkResults, ScraperError> {
        let url = self.endpoint(&["users", username, "bookmarks"], &page_query(page))?;
        let html = self.fetch_html(url, &format!("bookmarks for user {}", username))?;
        Ok(parse::parse_bookmark_list(&html))
    }

    pub fn get_work_bookmarks(
        &self,
        work_id: &str,
        page: u32,
    ) -> Result<BookmarkResults, ScraperError> {
        let url = self.endpoint(&["works", work_id, "bookmarks"], &page_query(page))?;
        let html = self.fetch_html(url, &format!("bookmarks for work {}", work_id))?;
        Ok(parse::parse_bookmark_list(&html))
    }

    /// Threaded comments on a work page.
    pub fn get_work_comments(
        &self,
        work_id: &str,
        page: u32,
    ) -> Result<CommentResults, ScraperError> {
        let url = self.endpoint(&["works", work_id], &comments_query(page))?;
        let html = self.fetch_html(url, &format!("comments for work {}", work_id))?;
        let ctx = CommentContext {
            work_id,
            chapter_id: None,
        };
        Ok(parse::parse_comment_list(&html, ctx))
    }

    pub fn get_chapter_comments(
        &self,
        work_id: &str,
        chapter_id: &str,
        page: u32,
    ) -> Result<CommentResults, ScraperError> {
        let url = self.endpoint(
            &["works", work_id, "chapters", chapter_id],
            &comments_query(page),
        )?;
        let html = self.fetch_html(
            url,
            &format!("comments for chapter {} of work {}", chapter_id, work_id),
        )?;
        let ctx = CommentContext {
            work_id,
            chapter_id: Some(chapter_id),
        };
        Ok(parse::parse_comment_list(&html, ctx))
    }
}
