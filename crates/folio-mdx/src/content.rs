//! Content types and where they live on disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// File extension of content files.
pub const CONTENT_EXTENSION: &str = "mdx";

/// Kind of content a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Long-form blog post
    Post,
    /// Short snippet
    Snippet,
}

impl ContentType {
    /// Directory (relative to the content root) holding this type.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Post => "content",
            Self::Snippet => "snippets",
        }
    }

    /// URL segment pages of this type are published under.
    pub fn route(&self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Snippet => "snippets",
        }
    }

    /// Whether documents of this type may embed static tweets.
    pub fn has_tweets(&self) -> bool {
        matches!(self, Self::Post)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => f.write_str("post"),
            Self::Snippet => f.write_str("snippet"),
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "post" | "posts" | "blogpost" => Ok(Self::Post),
            "snippet" | "snippets" => Ok(Self::Snippet),
            other => Err(format!("unknown content type: {}", other)),
        }
    }
}

/// Strip the content extension from a file name, yielding its slug.
pub fn slug_from_file_name(name: &str) -> &str {
    name.strip_suffix(".mdx").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_types_to_directories() {
        assert_eq!(ContentType::Post.dir_name(), "content");
        assert_eq!(ContentType::Snippet.dir_name(), "snippets");
    }

    #[test]
    fn parses_type_names() {
        assert_eq!("posts".parse::<ContentType>(), Ok(ContentType::Post));
        assert_eq!("Snippet".parse::<ContentType>(), Ok(ContentType::Snippet));
        assert!("page".parse::<ContentType>().is_err());
    }

    #[test]
    fn strips_extension() {
        assert_eq!(slug_from_file_name("hello-world.mdx"), "hello-world");
        assert_eq!(slug_from_file_name("notes.txt"), "notes.txt");
    }
}
