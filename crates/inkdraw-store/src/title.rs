//! Image-title templating.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Render an image title from a user template.
///
/// Supported fields: `{{short_text}}` (first 16 chars), `{{long_text}}`
/// (first 128 chars), `{{full_text}}` and `{{date_and_time}}`. Unknown
/// fields are left verbatim.
#[must_use]
pub fn make_image_title(template: &str, text: &str) -> String {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    let field = FIELD.get_or_init(|| Regex::new(r"\{\{([a-z_]+)\}\}").unwrap());

    let prefix = |len: usize| text.chars().take(len).collect::<String>();

    field
        .replace_all(template, |captures: &Captures<'_>| match &captures[1] {
            "short_text" => prefix(16),
            "long_text" => prefix(128),
            "full_text" => text.to_string(),
            "date_and_time" => chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            _ => captures[0].to_string(),
        })
        .into_owned()
}
