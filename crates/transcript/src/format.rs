//! Transcript text cleanup.
//!
//! Captured cue text arrives as one short line per cue, with the player's
//! line-wrapping intact and cues frequently re-rendered (and therefore
//! re-captured) verbatim. [`tidy`] turns that into prose: duplicates and
//! blank lines are dropped, wrapped fragments are merged back into
//! sentences using punctuation/capitalisation heuristics, and whitespace
//! is normalised. [`strip_standalone_timestamps`] removes the bare clock
//! lines some panel layouts render between cues.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static STANDALONE_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Drop lines that are nothing but a clock (`3:45`).
pub fn strip_standalone_timestamps(text: &str) -> String {
    text.lines()
        .filter(|line| !STANDALONE_CLOCK.is_match(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn ends_sentence(line: &str) -> bool {
    line.ends_with(['.', '!', '?'])
}

fn ends_with_any_punctuation(line: &str) -> bool {
    line.ends_with(['.', '!', '?', ',', ';', ':'])
}

fn starts_lowercase(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

/// Clean captured transcript lines into prose.
///
/// A line ending in `.!?` closes the sentence being accumulated; a line
/// starting lowercase, or without any closing punctuation, continues it;
/// anything else (capitalised, punctuated but unterminated) flushes the
/// accumulator and starts a new one. Duplicate lines are dropped on exact
/// match after trimming, preserving first-seen order.
pub fn tidy(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && seen.insert(trimmed.to_string()) {
            lines.push(trimmed);
        }
    }

    let mut merged = String::new();
    let mut pending = String::new();

    for line in lines {
        if ends_sentence(line) {
            if pending.is_empty() {
                merged.push_str(line);
            } else {
                merged.push_str(&pending);
                merged.push(' ');
                merged.push_str(line);
                pending.clear();
            }
            merged.push('\n');
        } else if starts_lowercase(line) || !ends_with_any_punctuation(line) {
            if !pending.is_empty() {
                pending.push(' ');
            }
            pending.push_str(line);
        } else {
            if !pending.is_empty() {
                merged.push_str(&pending);
                merged.push('\n');
            }
            pending = line.to_string();
        }
    }

    if !pending.is_empty() {
        merged.push_str(&pending);
    }

    let merged = merged.trim();
    let merged = BLANK_RUNS.replace_all(merged, "\n\n");
    SPACE_RUNS.replace_all(&merged, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn standalone_clocks_are_stripped() {
        let input = "0:01\nHello there.\n12:59\nmore text";
        assert_eq!(strip_standalone_timestamps(input), "Hello there.\nmore text");
    }

    #[test]
    fn embedded_clocks_survive() {
        let input = "at 3:45 we begin";
        assert_eq!(strip_standalone_timestamps(input), input);
    }

    #[test]
    fn duplicates_and_blanks_dropped_in_order() {
        let input = "Hello.\n\nHello.\nWorld.\nHello.";
        assert_eq!(tidy(input), "Hello.\nWorld.");
    }

    #[test]
    fn wrapped_fragments_merge_into_sentences() {
        let input = indoc! {"
            This lecture introduces
            the concept of grace
            and why it matters.
            Next week we continue.
        "};
        assert_eq!(
            tidy(input),
            "This lecture introduces the concept of grace and why it matters.\nNext week we continue."
        );
    }

    #[test]
    fn capitalised_unterminated_line_starts_fresh_accumulator() {
        let input = indoc! {"
            First point,
            which develops further.
            Second point,
            left hanging
        "};
        assert_eq!(
            tidy(input),
            "First point, which develops further.\nSecond point, left hanging"
        );
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(tidy("one\ttwo   three."), "one two three.");
    }

    #[test]
    fn tidy_is_idempotent_on_its_output() {
        let input = indoc! {"
            This lecture introduces
            the concept of grace.
            Second topic,
            still in flight
        "};
        let once = tidy(input);
        assert_eq!(tidy(&once), once);
    }
}
