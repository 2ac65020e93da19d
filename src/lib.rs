//! ao3scrape: parse Archive of Our Own pages into typed records, with a blocking client and CLI.

pub mod cli;
pub mod config;
pub mod formats;
pub mod logging;
pub mod model;
pub mod parse;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use crate::formats::{render, write_output, FormatError, Output, OutputFormat};
pub use crate::model::{
    Bookmark, BookmarkResults, BookmarkSearchResult, BookmarkedWork, Chapter, ChapterContent,
    ChapterProgress, Comment, CommentResults, Page, SearchResults, Series, SeriesStats,
    UserProfile, Work, WorkStats, WorkSummary, WorkTags,
};
pub use crate::scraper::{ArchiveClient, ArchiveClientBuilder, ScraperError, SearchOptions};
