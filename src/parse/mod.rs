//! Pure parsers from archive page markup to the typed model.
//!
//! Each parser takes one complete HTML document and never fails: missing or malformed fields
//! degrade to defaults (see [`crate::model`]). Markup is queried through `scraper`'s
//! [`ElementRef`](scraper::ElementRef) selector API.

pub mod extract;

mod bookmark;
mod comment;
mod listing;
mod series;
mod user;
mod work;

pub use bookmark::{parse_bookmark_item, parse_bookmark_list};
pub use comment::{build_comment_threads, parse_comment_list, parse_comments, CommentContext};
pub use listing::{parse_work_blurb, parse_work_list};
pub use series::parse_series;
pub use user::parse_user_profile;
pub use work::{parse_chapter_content, parse_chapters, parse_work};
