//! Sources of tweet data for static tweet embeds.

use std::fs;
use std::io;
use std::path::PathBuf;

use indexmap::IndexMap;

use folio_components::Tweet;

/// Errors that can occur while fetching tweets.
#[derive(Debug, thiserror::Error)]
pub enum TweetError {
    #[error("Failed to read tweet archive {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid tweet archive {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Fetches tweets by id.
pub trait TweetSource: Send + Sync {
    /// Fetch the tweets for `ids`.
    ///
    /// Ids the source knows nothing about are left out of the result.
    fn fetch(&self, ids: &[String]) -> Result<IndexMap<String, Tweet>, TweetError>;
}

/// A source that never has any tweets.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTweets;

impl TweetSource for NoTweets {
    fn fetch(&self, _ids: &[String]) -> Result<IndexMap<String, Tweet>, TweetError> {
        Ok(IndexMap::new())
    }
}

/// Tweets from a JSON archive on disk: an array of tweet objects.
///
/// The archive is read on every fetch so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct ArchiveTweetSource {
    path: PathBuf,
}

impl ArchiveTweetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Vec<Tweet>, TweetError> {
        let json = fs::read_to_string(&self.path).map_err(|source| TweetError::Io {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&json).map_err(|e| TweetError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl TweetSource for ArchiveTweetSource {
    fn fetch(&self, ids: &[String]) -> Result<IndexMap<String, Tweet>, TweetError> {
        let mut archive: IndexMap<String, Tweet> = self
            .read()?
            .into_iter()
            .map(|tweet| (tweet.id.clone(), tweet))
            .collect();

        let mut found = IndexMap::new();
        for id in ids {
            match archive.swap_remove(id) {
                Some(tweet) => {
                    found.insert(id.clone(), tweet);
                }
                None if found.contains_key(id) => {}
                None => tracing::warn!("Tweet {} is not in {}", id, self.path.display()),
            }
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ARCHIVE: &str = r#"[
        {"id": "111", "text": "first", "author": {"name": "A", "username": "a"}},
        {"id": "222", "text": "second", "author": {"name": "B", "username": "b"}, "likes": 5}
    ]"#;

    #[test]
    fn fetches_requested_tweets_in_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("tweets.json");
        fs::write(&path, ARCHIVE).unwrap();

        let tweets = ArchiveTweetSource::new(&path)
            .fetch(&["222".to_string(), "999".to_string(), "111".to_string()])
            .unwrap();

        let ids: Vec<&str> = tweets.keys().map(String::as_str).collect();
        assert_eq!(ids, ["222", "111"]);
        assert_eq!(tweets["222"].likes, 5);
    }

    #[test]
    fn repeated_ids_are_fetched_once() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("tweets.json");
        fs::write(&path, ARCHIVE).unwrap();

        let tweets = ArchiveTweetSource::new(&path)
            .fetch(&["111".to_string(), "111".to_string()])
            .unwrap();

        assert_eq!(tweets.len(), 1);
    }

    #[test]
    fn reports_missing_archive() {
        let temp = tempdir().unwrap();

        let err = ArchiveTweetSource::new(temp.path().join("nope.json"))
            .fetch(&["1".to_string()])
            .unwrap_err();

        assert!(matches!(err, TweetError::Io { .. }));
    }

    #[test]
    fn reports_malformed_archive() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("tweets.json");
        fs::write(&path, "{not json").unwrap();

        let err = ArchiveTweetSource::new(&path).fetch(&["1".to_string()]).unwrap_err();

        assert!(matches!(err, TweetError::Parse { .. }));
    }

    #[test]
    fn no_tweets_is_empty() {
        assert!(NoTweets.fetch(&["1".to_string()]).unwrap().is_empty());
    }
}
