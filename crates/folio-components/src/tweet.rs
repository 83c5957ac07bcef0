//! Tweet data rendered by static tweet embeds.

use serde::{Deserialize, Serialize};

/// A fetched tweet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub author: TweetAuthor,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
    /// Permalink recorded with the tweet, if any
    #[serde(default)]
    pub url: Option<String>,
}

/// Author of a tweet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetAuthor {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

impl Tweet {
    /// Permalink of the tweet, built from the author and id when not recorded.
    pub fn permalink(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "https://twitter.com/{}/status/{}",
                self.author.username, self.id
            ),
        }
    }
}

/// Link to a tweet known only by id.
pub fn status_url(id: &str) -> String {
    format!("https://twitter.com/i/web/status/{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_recorded_url_from_archive_entry() {
        let tweet: Tweet = serde_json::from_str(
            r#"{"id": "1", "text": "t", "author": {"name": "A", "username": "a"}, "url": "https://x.com/a/status/1"}"#,
        )
        .unwrap();

        assert_eq!(tweet.permalink(), "https://x.com/a/status/1");
        assert!(!tweet.author.verified);
    }

    #[test]
    fn builds_permalink_without_url() {
        let tweet: Tweet = serde_json::from_str(
            r#"{"id": "1", "text": "t", "author": {"name": "A", "username": "a"}}"#,
        )
        .unwrap();

        assert_eq!(tweet.permalink(), "https://twitter.com/a/status/1");
    }
}
