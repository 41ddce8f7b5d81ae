//! File-name slugs derived from post titles

/// Longest slug, in characters
pub const MAX_SLUG_LEN: usize = 60;

/// Slug used when a title has no alphanumeric characters
pub const EMPTY_SLUG: &str = "post";

/// Turn a title into a file-name-safe slug
///
/// The title is lower-cased and every run of non-alphanumeric characters
/// becomes a single `-`. Leading and trailing dashes are trimmed and the
/// result is cut to [`MAX_SLUG_LEN`] characters.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    let mut len = 0;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if !ch.is_alphanumeric() {
            pending_dash = true;
            continue;
        }
        let needed = if pending_dash && len > 0 { 2 } else { 1 };
        if len + needed > MAX_SLUG_LEN {
            break;
        }
        if pending_dash && len > 0 {
            slug.push('-');
            len += 1;
        }
        slug.push(ch);
        len += 1;
        pending_dash = false;
    }

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}
