//! User profile page.

use crate::model::UserProfile;
use crate::parse::extract::{extract_labeled_text, first_inner_html, first_text, select_first};
use scraper::Html;

/// Parse a profile page (`/users/{name}/profile`).
///
/// The username comes from the rendered heading, not from the request, so callers see the
/// archive's canonical casing. `bio_html` is `None` only when there is no bio container; a
/// container with empty content yields `Some("")`.
pub fn parse_user_profile(html: &str) -> UserProfile {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let (user_id, joined) = match select_first(root, "dl.meta") {
        Some(meta) => (
            extract_labeled_text(meta, "My user ID is:"),
            extract_labeled_text(meta, "I joined on:"),
        ),
        None => (String::new(), String::new()),
    };

    UserProfile {
        username: first_text(root, "h2.heading"),
        user_id,
        joined,
        bio_html: first_inner_html(root, ".bio.module .userstuff"),
    }
}
