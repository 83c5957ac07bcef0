//! Reading time estimate.

use serde::Serialize;

/// Words read per minute.
pub const WORDS_PER_MINUTE: f64 = 200.0;

/// Estimated reading duration of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingTime {
    /// Human readable estimate, e.g. "3 min read"
    pub text: String,
    /// Fractional minutes
    pub minutes: f64,
    /// Milliseconds
    pub time: u64,
    /// Words counted
    pub words: usize,
}

/// Estimate how long `text` takes to read.
///
/// A word is any whitespace-separated token with at least one alphanumeric
/// character, so markup punctuation such as `---` or `/>` is not counted.
pub fn reading_time(text: &str) -> ReadingTime {
    let words = text
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count();

    let minutes = words as f64 / WORDS_PER_MINUTE;
    let displayed = ((minutes * 100.0).round() / 100.0).ceil() as u64;

    ReadingTime {
        text: format!("{} min read", displayed),
        minutes,
        time: (minutes * 60_000.0).round() as u64,
        words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words() {
        let rt = reading_time("one two three\n\nfour --- five />");
        assert_eq!(rt.words, 5);
    }

    #[test]
    fn rounds_up_partial_minutes() {
        let text = "word ".repeat(250);
        let rt = reading_time(&text);

        assert_eq!(rt.words, 250);
        assert_eq!(rt.text, "2 min read");
        assert_eq!(rt.time, 75_000);
    }

    #[test]
    fn empty_text_reads_instantly() {
        let rt = reading_time("");
        assert_eq!(rt.words, 0);
        assert_eq!(rt.text, "0 min read");
    }
}
