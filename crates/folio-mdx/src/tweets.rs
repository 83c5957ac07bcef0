//! Static tweet reference extraction.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `<StaticTweet id="1234" />`, whitespace before `/>` optional.
static TWEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<StaticTweet\s+id="([0-9]+)"\s*/>"#).expect("Invalid static tweet regex")
});

/// Find every static tweet marker in `source` and return the tweet ids.
///
/// Ids are returned in order of appearance. Repeated markers produce repeated ids.
pub fn extract_tweet_ids(source: &str) -> Vec<String> {
    TWEET_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
