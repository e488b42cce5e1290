use std::sync::LazyLock;

use regex::Regex;

static CLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:(\d+):)?(\d+):(\d+)").unwrap());

static LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[?(\d+:\d+(?::\d+)?)\]?").unwrap());

/// Parse the first `MM:SS` or `HH:MM:SS` clock found anywhere in `text`
/// into whole seconds. Strings with no clock in them parse to 0.
pub fn clock_to_seconds(text: &str) -> u64 {
    let Some(caps) = CLOCK.captures(text) else {
        return 0;
    };

    let field = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    match caps.get(1) {
        Some(_) => field(1) * 3600 + field(2) * 60 + field(3),
        None => field(2) * 60 + field(3),
    }
}

/// Extract the clock a cue line starts with, tolerating optional square
/// brackets around it (`0:12 text`, `[1:02:03] text`).
pub fn leading_timestamp(text: &str) -> Option<&str> {
    LEADING
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(clock_to_seconds("1:05"), 65);
    }

    #[test]
    fn hours_minutes_seconds() {
        assert_eq!(clock_to_seconds("01:02:03"), 3723);
    }

    #[test]
    fn clock_embedded_in_cue_text() {
        assert_eq!(clock_to_seconds("cue at 2:30 continues"), 150);
    }

    #[test]
    fn no_digits_is_zero() {
        assert_eq!(clock_to_seconds("no digits here"), 0);
        assert_eq!(clock_to_seconds(""), 0);
    }

    #[test]
    fn leading_timestamp_variants() {
        assert_eq!(leading_timestamp("0:12 hello"), Some("0:12"));
        assert_eq!(leading_timestamp("[1:02:03] hello"), Some("1:02:03"));
        assert_eq!(leading_timestamp("hello 0:12"), None);
    }
}
