//! Output rendering: JSON for every entity, Markdown and plain text for works and chapters.

use crate::model::{
    BookmarkResults, Chapter, ChapterContent, ChapterProgress, CommentResults, SearchResults,
    Series, UserProfile, Work,
};
use crate::parse::extract::selector;
use scraper::Html;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Output format selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
    Text,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(format!(
                "unknown format '{}'; use json, markdown or text",
                other
            )),
        }
    }
}

/// Errors from rendering and writing output.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{format} output is not available for {entity}; use --format json")]
    Unsupported {
        format: &'static str,
        entity: &'static str,
    },

    #[error("Failed to serialize {entity} as JSON: {source}")]
    Json {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Render(#[from] fmt::Error),
}

/// Anything a command can print.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Work(Work),
    Chapters(Vec<Chapter>),
    ChapterContent(ChapterContent),
    Series(Series),
    User(UserProfile),
    Works(SearchResults),
    Bookmarks(BookmarkResults),
    Comments(CommentResults),
}

impl Output {
    /// Entity name used in messages.
    pub fn entity(&self) -> &'static str {
        match self {
            Output::Work(_) => "work",
            Output::Chapters(_) => "chapter list",
            Output::ChapterContent(_) => "chapter",
            Output::Series(_) => "series",
            Output::User(_) => "user profile",
            Output::Works(_) => "work listing",
            Output::Bookmarks(_) => "bookmark listing",
            Output::Comments(_) => "comment listing",
        }
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Output::Work(v) => serde_json::to_string_pretty(v),
            Output::Chapters(v) => serde_json::to_string_pretty(v),
            Output::ChapterContent(v) => serde_json::to_string_pretty(v),
            Output::Series(v) => serde_json::to_string_pretty(v),
            Output::User(v) => serde_json::to_string_pretty(v),
            Output::Works(v) => serde_json::to_string_pretty(v),
            Output::Bookmarks(v) => serde_json::to_string_pretty(v),
            Output::Comments(v) => serde_json::to_string_pretty(v),
        }
    }
}

/// Fail early when `format` cannot render `entity` (see [`Output::entity`]). JSON renders
/// everything; Markdown and text exist only for works and chapter content.
pub fn check_supported(format: OutputFormat, entity: &'static str) -> Result<(), FormatError> {
    match (format, entity) {
        (OutputFormat::Json, _) | (_, "work") | (_, "chapter") => Ok(()),
        (format, entity) => Err(FormatError::Unsupported {
            format: format.name(),
            entity,
        }),
    }
}

/// Render `output` in `format`.
pub fn render(output: &Output, format: OutputFormat) -> Result<String, FormatError> {
    match (format, output) {
        (OutputFormat::Json, _) => output.to_json().map_err(|e| FormatError::Json {
            entity: output.entity(),
            source: e,
        }),
        (OutputFormat::Markdown, Output::Work(work)) => Ok(work_markdown(work)?),
        (OutputFormat::Markdown, Output::ChapterContent(ch)) => Ok(chapter_markdown(ch)?),
        (OutputFormat::Text, Output::Work(work)) => Ok(work_text(work)?),
        (OutputFormat::Text, Output::ChapterContent(ch)) => Ok(chapter_text(ch)?),
        (format, other) => Err(FormatError::Unsupported {
            format: format.name(),
            entity: other.entity(),
        }),
    }
}

/// Write rendered output to `path`, or stdout when `None`. A trailing newline is ensured.
pub fn write_output(rendered: &str, path: Option<&Path>) -> Result<(), FormatError> {
    match path {
        Some(path) => {
            let mut f = File::create(path).map_err(|e| FormatError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            write_with_newline(&mut f, rendered).map_err(|e| FormatError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_with_newline(&mut lock, rendered)?;
            Ok(())
        }
    }
}

fn write_with_newline(w: &mut impl Write, s: &str) -> std::io::Result<()> {
    w.write_all(s.as_bytes())?;
    if !s.ends_with('\n') {
        w.write_all(b"\n")?;
    }
    w.flush()
}

/// "posted/total", with `?` for an open-ended work.
fn progress_label(p: ChapterProgress) -> String {
    match p.total {
        Some(total) => format!("{}/{}", p.posted, total),
        None => format!("{}/?", p.posted),
    }
}

fn push_list(out: &mut String, label: &str, items: &[String]) -> fmt::Result {
    if !items.is_empty() {
        writeln!(out, "{}: {}", label, items.join(", "))?;
    }
    Ok(())
}

fn work_markdown(work: &Work) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# {}\n", work.title)?;
    writeln!(out, "By {}\n", work.author)?;
    let mut meta = String::new();
    if !work.tags.rating.is_empty() {
        writeln!(meta, "Rating: {}", work.tags.rating)?;
    }
    push_list(&mut meta, "Warnings", &work.tags.warnings)?;
    push_list(&mut meta, "Categories", &work.tags.category)?;
    push_list(&mut meta, "Fandoms", &work.tags.fandoms)?;
    push_list(&mut meta, "Relationships", &work.tags.relationships)?;
    push_list(&mut meta, "Characters", &work.tags.characters)?;
    push_list(&mut meta, "Additional Tags", &work.tags.freeforms)?;
    if !work.language.is_empty() {
        writeln!(meta, "Language: {}", work.language)?;
    }
    for line in meta.lines() {
        if let Some((label, value)) = line.split_once(": ") {
            writeln!(out, "- **{}:** {}", label, value)?;
        }
    }
    writeln!(
        out,
        "- **Stats:** published {}{}, {} words, {} chapters, {} hits\n",
        work.stats.published,
        work.stats
            .updated
            .as_deref()
            .map(|u| format!(", updated {}", u))
            .unwrap_or_default(),
        work.stats.words,
        progress_label(work.stats.chapters),
        work.stats.hits
    )?;
    if !work.summary.is_empty() {
        writeln!(out, "## Summary\n")?;
        writeln!(out, "{}", html2md::parse_html(&work.summary).trim())?;
    }
    Ok(out)
}

fn work_text(work: &Work) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", work.title)?;
    writeln!(out, "By {}\n", work.author)?;
    if !work.tags.rating.is_empty() {
        writeln!(out, "Rating: {}", work.tags.rating)?;
    }
    push_list(&mut out, "Warnings", &work.tags.warnings)?;
    push_list(&mut out, "Categories", &work.tags.category)?;
    push_list(&mut out, "Fandoms", &work.tags.fandoms)?;
    push_list(&mut out, "Relationships", &work.tags.relationships)?;
    push_list(&mut out, "Characters", &work.tags.characters)?;
    push_list(&mut out, "Additional Tags", &work.tags.freeforms)?;
    if !work.language.is_empty() {
        writeln!(out, "Language: {}", work.language)?;
    }
    writeln!(out, "Published: {}", work.stats.published)?;
    if let Some(updated) = &work.stats.updated {
        writeln!(out, "Updated: {}", updated)?;
    }
    writeln!(
        out,
        "Words: {}  Chapters: {}  Hits: {}",
        work.stats.words,
        progress_label(work.stats.chapters),
        work.stats.hits
    )?;
    if !work.summary.is_empty() {
        writeln!(out, "\nSummary:\n{}", body_to_plain_text(&work.summary))?;
    }
    Ok(out)
}

fn chapter_markdown(ch: &ChapterContent) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# {}\n", ch.title)?;
    let sections = [
        ("Summary", ch.summary.as_deref()),
        ("Notes", ch.notes.as_deref()),
    ];
    for (heading, html) in sections {
        if let Some(html) = html {
            writeln!(out, "## {}\n\n{}\n", heading, html2md::parse_html(html).trim())?;
        }
    }
    if !sections.iter().all(|(_, html)| html.is_none()) {
        writeln!(out, "---\n")?;
    }
    writeln!(out, "{}", html2md::parse_html(&ch.content).trim())?;
    if let Some(end_notes) = ch.end_notes.as_deref() {
        writeln!(
            out,
            "\n---\n\n## End Notes\n\n{}",
            html2md::parse_html(end_notes).trim()
        )?;
    }
    Ok(out)
}

fn chapter_text(ch: &ChapterContent) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}\n", ch.title)?;
    if let Some(summary) = ch.summary.as_deref() {
        writeln!(out, "Summary:\n{}\n", body_to_plain_text(summary))?;
    }
    if let Some(notes) = ch.notes.as_deref() {
        writeln!(out, "Notes:\n{}\n", body_to_plain_text(notes))?;
    }
    writeln!(out, "{}", body_to_plain_text(&ch.content))?;
    if let Some(end_notes) = ch.end_notes.as_deref() {
        writeln!(out, "\nEnd Notes:\n{}", body_to_plain_text(end_notes))?;
    }
    Ok(out)
}

/// Strip markup to plain text, one blank line between paragraphs. Markup without paragraphs
/// falls back to its concatenated text, and text without markup is returned trimmed.
pub(crate) fn body_to_plain_text(body: &str) -> String {
    let fragment = Html::parse_fragment(body);
    let root = fragment.root_element();
    let paragraphs: Vec<String> = match selector("p") {
        Some(sel) => root
            .select(&sel)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        None => Vec::new(),
    };
    if !paragraphs.is_empty() {
        return paragraphs.join("\n\n");
    }
    let text: String = root.text().collect();
    if text.trim().is_empty() {
        body.trim().to_string()
    } else {
        text.trim().to_string()
    }
}
