use std::sync::LazyLock;

use regex::Regex;

/// Base name used when a title sanitises down to nothing.
pub const FALLBACK_BASENAME: &str = "vimeo_transcript";

const MAX_LEN: usize = 50;

static ILLEGAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Turn a video title into a filesystem-safe base filename: illegal
/// characters become `_`, whitespace collapses, and the result is trimmed
/// and truncated to 50 characters. Idempotent.
pub fn sanitize(title: &str) -> String {
    let cleaned = ILLEGAL.replace_all(title, "_");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let mut cleaned = cleaned.trim().to_string();

    if cleaned.chars().count() > MAX_LEN {
        cleaned = cleaned.chars().take(MAX_LEN).collect::<String>();
        cleaned = cleaned.trim().to_string();
    }

    if cleaned.is_empty() {
        return FALLBACK_BASENAME.to_string();
    }

    cleaned
}

/// Append `.txt` unless the name already carries it.
pub fn with_txt_extension(name: &str) -> String {
    if name.ends_with(".txt") {
        name.to_string()
    } else {
        format!("{name}.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_characters_become_underscores() {
        assert_eq!(sanitize(r#"a\b/c:d*e?f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn whitespace_collapses_and_trims() {
        assert_eq!(sanitize("  Week 3:   Intro  "), "Week 3_ Intro");
    }

    #[test]
    fn long_titles_truncate_to_fifty() {
        let long = "x".repeat(80);
        assert_eq!(sanitize(&long).chars().count(), 50);
    }

    #[test]
    fn empty_input_uses_fallback() {
        assert_eq!(sanitize(""), FALLBACK_BASENAME);
        assert_eq!(sanitize("   "), FALLBACK_BASENAME);
        assert_eq!(sanitize("???"), "___");
    }

    #[test]
    fn idempotent_on_already_sanitized_names() {
        let once = sanitize("Lecture 4: The \"Great\" Divide / Part 2");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn txt_extension_added_once() {
        assert_eq!(with_txt_extension("notes"), "notes.txt");
        assert_eq!(with_txt_extension("notes.txt"), "notes.txt");
    }
}
