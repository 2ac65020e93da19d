//! CLI parsing and orchestration. Parses args, fetches one archive page, renders it as JSON,
//! Markdown or text. Maps errors to exit codes.

use crate::config::{self, Config};
use crate::formats::{check_supported, render, write_output, FormatError, Output, OutputFormat};
use crate::scraper::{
    ArchiveClient, Category, Rating, ScraperError, SearchOptions, SortColumn, SortDirection,
    Warning,
};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Format(#[from] FormatError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Format(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ao3scrape", version)]
#[command(about = "Fetch works, chapters, series, users, bookmarks and comments from Archive of Our Own")]
#[command(
    after_help = "Config file keys (user_agent, timeout_secs, proxy_url, format) are read from ./ao3scrape.toml or the user config directory. CLI flags override config."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format: json, markdown, or text (overrides config; default json).
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Write output to this file instead of stdout.
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// HTTP User-Agent (overrides config).
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Proxy URL for all requests (overrides config).
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Print the error cause chain and more log output. Repeat for debug logs.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Work metadata, tags and stats.
    Work { work_id: String },

    /// Chapter index of a work.
    Chapters { work_id: String },

    /// Text of one chapter, with its summary and notes.
    Chapter { work_id: String, chapter_id: String },

    /// Series metadata and its works.
    Series { series_id: String },

    /// User profile.
    User { username: String },

    /// One page of a user's works.
    UserWorks {
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Search works.
    Search(SearchArgs),

    /// One page of works filed under a tag.
    Tag {
        tag: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Bookmarks made by a user, or made on a work.
    Bookmarks {
        #[command(subcommand)]
        target: BookmarkTarget,
    },

    /// Comments on a work, or on one of its chapters.
    Comments {
        work_id: String,
        /// Chapter id; comments on the whole work when omitted.
        #[arg(long)]
        chapter: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum BookmarkTarget {
    /// Bookmarks a user has made.
    User {
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Bookmarks other users have made on a work.
    Work {
        work_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

/// Search filters. Range values use the archive's syntax, e.g. ">1000" or "100-500".
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct SearchArgs {
    /// Free-text query.
    pub query: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    /// Creator names.
    #[arg(long)]
    pub creators: Option<String>,

    /// Last-updated window, e.g. "< 2 weeks".
    #[arg(long)]
    pub revised_at: Option<String>,

    /// Only complete works.
    #[arg(long, conflicts_with = "incomplete")]
    pub complete: bool,

    /// Only works in progress.
    #[arg(long)]
    pub incomplete: bool,

    /// Only single-chapter works.
    #[arg(long)]
    pub single_chapter: bool,

    /// Word count range.
    #[arg(long = "words")]
    pub word_count: Option<String>,

    /// Language id, e.g. "en".
    #[arg(long)]
    pub language: Option<String>,

    /// Fandom name; repeatable.
    #[arg(long = "fandom")]
    pub fandoms: Vec<String>,

    /// Rating: not-rated, general, teen, mature, explicit; repeatable.
    #[arg(long = "rating")]
    pub ratings: Vec<Rating>,

    /// Archive warning: choose-not-to-use, none, violence, death, noncon, underage; repeatable.
    #[arg(long = "warning")]
    pub warnings: Vec<Warning>,

    /// Category: f/f, f/m, gen, m/m, multi, other, non-binary; repeatable.
    #[arg(long = "category")]
    pub categories: Vec<Category>,

    /// Character name; repeatable.
    #[arg(long = "character")]
    pub characters: Vec<String>,

    /// Relationship name; repeatable.
    #[arg(long = "relationship")]
    pub relationships: Vec<String>,

    /// Additional (freeform) tag; repeatable.
    #[arg(long = "freeform")]
    pub freeforms: Vec<String>,

    /// Hit count range.
    #[arg(long)]
    pub hits: Option<String>,

    /// Kudos count range.
    #[arg(long)]
    pub kudos: Option<String>,

    /// Comment count range.
    #[arg(long)]
    pub comments: Option<String>,

    /// Bookmark count range.
    #[arg(long)]
    pub bookmarks: Option<String>,

    /// Sort column: best-match, author, title, posted, updated, words, hits, kudos, comments, bookmarks.
    #[arg(long = "sort")]
    pub sort_column: Option<SortColumn>,

    /// Sort direction: asc or desc (default desc).
    #[arg(long = "direction")]
    pub sort_direction: Option<SortDirection>,

    #[arg(long)]
    pub page: Option<u32>,
}

impl SearchArgs {
    pub fn to_options(&self) -> SearchOptions {
        let complete = match (self.complete, self.incomplete) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        SearchOptions {
            query: self.query.clone(),
            title: self.title.clone(),
            creators: self.creators.clone(),
            revised_at: self.revised_at.clone(),
            complete,
            single_chapter: self.single_chapter,
            word_count: self.word_count.clone(),
            language: self.language.clone(),
            fandoms: self.fandoms.clone(),
            ratings: self.ratings.clone(),
            warnings: self.warnings.clone(),
            categories: self.categories.clone(),
            characters: self.characters.clone(),
            relationships: self.relationships.clone(),
            freeforms: self.freeforms.clone(),
            hits: self.hits.clone(),
            kudos: self.kudos.clone(),
            comments: self.comments.clone(),
            bookmarks: self.bookmarks.clone(),
            sort_column: self.sort_column,
            sort_direction: self.sort_direction,
            page: self.page,
        }
    }
}

impl Command {
    /// Entity the command produces; matches [`Output::entity`].
    pub fn entity(&self) -> &'static str {
        match self {
            Command::Work { .. } => "work",
            Command::Chapters { .. } => "chapter list",
            Command::Chapter { .. } => "chapter",
            Command::Series { .. } => "series",
            Command::User { .. } => "user profile",
            Command::UserWorks { .. } | Command::Search(_) | Command::Tag { .. } => "work listing",
            Command::Bookmarks { .. } => "bookmark listing",
            Command::Comments { .. } => "comment listing",
        }
    }
}

/// Effective settings after merging flags over config over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub format: OutputFormat,
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
    pub proxy_url: Option<String>,
}

pub fn resolve_settings(args: &Args, config: &Config) -> Result<Settings, CliRunError> {
    let format = match (args.format, config.format.as_deref()) {
        (Some(f), _) => f,
        (None, Some(s)) => s
            .parse()
            .map_err(|e| CliRunError::InvalidInput(format!("Invalid format in config: {}", e)))?,
        (None, None) => OutputFormat::default(),
    };
    Ok(Settings {
        format,
        user_agent: args.user_agent.clone().or_else(|| config.user_agent.clone()),
        timeout_secs: args
            .timeout
            .or(config.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        proxy_url: args.proxy.clone().or_else(|| config.proxy_url.clone()),
    })
}

fn build_client(settings: &Settings) -> Result<ArchiveClient, CliRunError> {
    let mut builder = ArchiveClient::builder().timeout_secs(settings.timeout_secs);
    if let Some(ua) = &settings.user_agent {
        builder = builder.user_agent(ua.as_str());
    }
    if let Some(proxy) = &settings.proxy_url {
        builder = builder.proxy_url(proxy.as_str());
    }
    builder.build().map_err(|e| match e {
        ScraperError::InvalidUrl { .. } => CliRunError::InvalidInput(e.to_string()),
        other => CliRunError::Scraper(other),
    })
}

fn require(name: &str, value: &str) -> Result<(), CliRunError> {
    if value.trim().is_empty() {
        return Err(CliRunError::InvalidInput(format!("{} must not be empty.", name)));
    }
    Ok(())
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Run one command against the archive.
pub fn execute(client: &ArchiveClient, command: &Command) -> Result<Output, CliRunError> {
    let output = match command {
        Command::Work { work_id } => {
            require("Work id", work_id)?;
            Output::Work(client.get_work(work_id)?)
        }
        Command::Chapters { work_id } => {
            require("Work id", work_id)?;
            Output::Chapters(client.get_chapters(work_id)?)
        }
        Command::Chapter {
            work_id,
            chapter_id,
        } => {
            require("Work id", work_id)?;
            require("Chapter id", chapter_id)?;
            Output::ChapterContent(client.get_chapter_content(work_id, chapter_id)?)
        }
        Command::Series { series_id } => {
            require("Series id", series_id)?;
            Output::Series(client.get_series(series_id)?)
        }
        Command::User { username } => {
            require("Username", username)?;
            Output::User(client.get_user_profile(username)?)
        }
        Command::UserWorks { username, page } => {
            require("Username", username)?;
            Output::Works(client.get_user_works(username, *page)?)
        }
        Command::Search(search) => Output::Works(client.search(&search.to_options())?),
        Command::Tag { tag, page } => {
            require("Tag", tag)?;
            Output::Works(client.get_tag_works(tag, *page)?)
        }
        Command::Bookmarks {
            target: BookmarkTarget::User { username, page },
        } => {
            require("Username", username)?;
            Output::Bookmarks(client.get_user_bookmarks(username, *page)?)
        }
        Command::Bookmarks {
            target: BookmarkTarget::Work { work_id, page },
        } => {
            require("Work id", work_id)?;
            Output::Bookmarks(client.get_work_bookmarks(work_id, *page)?)
        }
        Command::Comments {
            work_id,
            chapter,
            page,
        } => {
            require("Work id", work_id)?;
            match chapter {
                Some(chapter_id) => {
                    require("Chapter id", chapter_id)?;
                    Output::Comments(client.get_chapter_comments(work_id, chapter_id, *page)?)
                }
                None => Output::Comments(client.get_work_comments(work_id, *page)?),
            }
        }
    };
    Ok(output)
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config()
        .map_err(CliRunError::InvalidInput)?
        .unwrap_or_default();
    let settings = resolve_settings(args, &config)?;

    check_supported(settings.format, args.command.entity())?;
    if let Some(path) = &args.output {
        validate_output_path(path)?;
    }

    let client = build_client(&settings)?;
    let output = execute(&client, &args.command)?;
    let rendered = render(&output, settings.format)?;
    write_output(&rendered, args.output.as_deref())?;

    if let Some(path) = &args.output {
        info!(path = %path.display(), format = settings.format.name(), "wrote output");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::test_server::TestServer;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let args = parse(&[
            "ao3scrape", "work", "123", "--format", "markdown", "-o", "out.md", "-vv",
        ]);
        assert_eq!(
            args.command,
            Command::Work {
                work_id: "123".into()
            }
        );
        assert_eq!(args.format, Some(OutputFormat::Markdown));
        assert_eq!(args.output, Some(PathBuf::from("out.md")));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn bookmarks_and_comments_subcommands() {
        let args = parse(&["ao3scrape", "bookmarks", "user", "reader", "--page", "3"]);
        assert_eq!(
            args.command,
            Command::Bookmarks {
                target: BookmarkTarget::User {
                    username: "reader".into(),
                    page: 3
                }
            }
        );
        let args = parse(&["ao3scrape", "comments", "5", "--chapter", "6"]);
        assert_eq!(
            args.command,
            Command::Comments {
                work_id: "5".into(),
                chapter: Some("6".into()),
                page: 1
            }
        );
    }

    #[test]
    fn search_flags_build_options() {
        let args = parse(&[
            "ao3scrape",
            "search",
            "coffee shop",
            "--rating",
            "teen",
            "--rating",
            "mature",
            "--category",
            "m/m",
            "--fandom",
            "Good Omens",
            "--incomplete",
            "--sort",
            "kudos",
            "--direction",
            "asc",
        ]);
        let Command::Search(search) = args.command else {
            panic!("expected search command");
        };
        let options = search.to_options();
        assert_eq!(options.query.as_deref(), Some("coffee shop"));
        assert_eq!(options.ratings, vec![Rating::TeenAndUp, Rating::Mature]);
        assert_eq!(options.categories, vec![Category::MaleMale]);
        assert_eq!(options.fandoms, vec!["Good Omens".to_string()]);
        assert_eq!(options.complete, Some(false));
        assert_eq!(options.sort_column, Some(SortColumn::Kudos));
        assert_eq!(options.sort_direction, Some(SortDirection::Asc));
    }

    #[test]
    fn complete_and_incomplete_conflict() {
        let result = Args::try_parse_from(["ao3scrape", "search", "--complete", "--incomplete"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_rating_is_rejected_by_parser() {
        let result = Args::try_parse_from(["ao3scrape", "search", "--rating", "lukewarm"]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_override_config_which_overrides_defaults() -> Result<(), CliRunError> {
        let config = Config {
            user_agent: Some("Config/1.0".into()),
            timeout_secs: Some(10),
            proxy_url: Some("http://proxy.local:8080".into()),
            format: Some("text".into()),
        };
        let args = parse(&["ao3scrape", "--timeout", "5", "work", "1"]);
        let settings = resolve_settings(&args, &config)?;
        assert_eq!(settings.format, OutputFormat::Text);
        assert_eq!(settings.user_agent.as_deref(), Some("Config/1.0"));
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.proxy_url.as_deref(), Some("http://proxy.local:8080"));

        let defaults = resolve_settings(&parse(&["ao3scrape", "work", "1"]), &Config::default())?;
        assert_eq!(defaults.format, OutputFormat::Json);
        assert_eq!(defaults.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(defaults.proxy_url, None);
        Ok(())
    }

    #[test]
    fn invalid_config_format_is_invalid_input() {
        let config = Config {
            format: Some("epub".into()),
            ..Default::default()
        };
        let result = resolve_settings(&parse(&["ao3scrape", "work", "1"]), &config);
        assert!(matches!(result, Err(CliRunError::InvalidInput(_))));
    }

    #[test]
    fn markdown_is_rejected_for_listings_before_fetching() {
        let args = parse(&["ao3scrape", "--format", "markdown", "series", "1"]);
        let result = check_supported(OutputFormat::Markdown, args.command.entity());
        assert!(matches!(result, Err(FormatError::Unsupported { .. })));
        assert!(check_supported(OutputFormat::Text, "chapter").is_ok());
    }

    #[test]
    fn execute_fetches_and_wraps_entity() -> Result<(), CliRunError> {
        let page = r#"<h2 class="heading">quill</h2>
            <dl class="meta"><dt>My user ID is:</dt><dd>77</dd></dl>"#;
        let server = TestServer::spawn(vec![("/users/quill/profile", 200, page)]);
        let client = ArchiveClient::builder().base_url(&server.base_url).build()?;
        let output = execute(
            &client,
            &Command::User {
                username: "quill".into(),
            },
        )?;
        match output {
            Output::User(profile) => {
                assert_eq!(profile.username, "quill");
                assert_eq!(profile.user_id, "77");
            }
            other => panic!("expected user profile, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn execute_maps_missing_page_to_retrieval_error() -> Result<(), CliRunError> {
        let server = TestServer::spawn(Vec::new());
        let client = ArchiveClient::builder().base_url(&server.base_url).build()?;
        let err = match execute(&client, &Command::Series { series_id: "9".into() }) {
            Ok(output) => panic!("expected error, got {:?}", output),
            Err(err) => err,
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Failed to fetch series 9. Status: 404");
        Ok(())
    }

    #[test]
    fn empty_ids_are_invalid_input() {
        let client = ArchiveClient::new().unwrap();
        let result = execute(
            &client,
            &Command::Work {
                work_id: "  ".into(),
            },
        );
        assert!(matches!(result, Err(CliRunError::InvalidInput(_))));
    }

    #[test]
    fn bad_proxy_is_invalid_input() {
        let settings = Settings {
            format: OutputFormat::Json,
            user_agent: None,
            timeout_secs: 5,
            proxy_url: Some("ftp://proxy.example:21".into()),
        };
        let result = build_client(&settings);
        assert!(matches!(result, Err(CliRunError::InvalidInput(_))));
    }

    #[test]
    fn validate_output_path_parent_exists() {
        let path = std::env::temp_dir().join("ao3scrape_cli_test_output.json");
        assert!(validate_output_path(&path).is_ok());
    }

    #[test]
    fn validate_output_path_parent_missing() {
        let path = PathBuf::from("/nonexistent_dir_ao3scrape_xyz/output.json");
        let result = validate_output_path(&path);
        assert!(result.is_err());
        if let Err(CliRunError::InvalidInput(msg)) = result {
            assert!(msg.contains("parent directory does not exist"));
        }
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        assert_eq!(
            CliRunError::Scraper(ScraperError::HttpStatus {
                status: 404,
                url: "u".into(),
                context: "work 1".into()
            })
            .exit_code(),
            2
        );
        assert_eq!(
            CliRunError::Format(FormatError::Unsupported {
                format: "text",
                entity: "series"
            })
            .exit_code(),
            3
        );
    }
}
