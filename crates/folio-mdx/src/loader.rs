//! Loading content from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::bundler::{Bundle, BundleError, MdxBundler};
use crate::content::{slug_from_file_name, ContentType, CONTENT_EXTENSION};
use crate::frontmatter::{extract_frontmatter, newest_first, FrontMatter, FrontmatterError};
use crate::reading_time::reading_time;
use crate::tweets::extract_tweet_ids;

/// Logical name of the scroll-spy widget module.
pub const SCROLL_SPY_MODULE: &str = "./ScrollSpyWidget.tsx";

/// Logical name of the theme context module.
pub const THEME_CONTEXT_MODULE: &str = "./ThemeContext.tsx";

/// Frontmatter key the reading time estimate is stored under.
pub const READING_TIME_KEY: &str = "readingTime";

/// Locations of the support modules made available to every document.
///
/// Relative paths resolve against the content root.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportFiles {
    pub scroll_spy: PathBuf,
    pub theme_context: PathBuf,
}

impl Default for SupportFiles {
    fn default() -> Self {
        Self {
            scroll_spy: PathBuf::from("core/components/MDX/custom/Widgets/ScrollSpyWidget.tsx"),
            theme_context: PathBuf::from("core/context/ThemeContext.tsx"),
        }
    }
}

/// A fully loaded document.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub slug: String,
    pub content_type: ContentType,
    pub bundle: Bundle,
    /// Document frontmatter with the reading time estimate merged in
    pub front_matter: FrontMatter,
    /// Static tweets referenced by the document (always empty for snippets)
    pub tweet_ids: Vec<String>,
}

/// Frontmatter of one file, for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub slug: String,
    pub front_matter: FrontMatter,
}

/// Errors that can occur when loading content.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No {content_type} found for slug \"{slug}\"")]
    NotFound {
        content_type: ContentType,
        slug: String,
    },

    #[error("Invalid slug \"{0}\"")]
    InvalidSlug(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to read support file {}: {source}", path.display())]
    SupportFile { path: PathBuf, source: io::Error },

    #[error("Frontmatter error in {}: {source}", path.display())]
    Frontmatter {
        path: PathBuf,
        source: FrontmatterError,
    },

    #[error("Failed to bundle {}: {source}", path.display())]
    Bundle { path: PathBuf, source: BundleError },
}

/// Loads content from a blog's root directory.
pub struct ContentLoader {
    root: PathBuf,
    support: SupportFiles,
    bundler: MdxBundler,
}

impl ContentLoader {
    /// Create a loader rooted at `root` with the default support file locations.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            support: SupportFiles::default(),
            bundler: MdxBundler::new(),
        }
    }

    /// Use different support file locations.
    pub fn with_support_files(mut self, support: SupportFiles) -> Self {
        self.support = support;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute locations of the support files.
    pub fn support_paths(&self) -> [PathBuf; 2] {
        [
            self.root.join(&self.support.scroll_spy),
            self.root.join(&self.support.theme_context),
        ]
    }

    /// Directory holding content of `content_type`.
    pub fn content_dir(&self, content_type: ContentType) -> PathBuf {
        self.root.join(content_type.dir_name())
    }

    /// Names of all files in the content directory, sorted by name.
    ///
    /// Nothing is filtered out. A missing directory is an error.
    pub fn list_files(&self, content_type: ContentType) -> Result<Vec<String>, LoadError> {
        let dir = self.content_dir(content_type);
        let io_err = |source| LoadError::Io {
            path: dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(names)
    }

    /// Slugs of all files in the content directory.
    pub fn slugs(&self, content_type: ContentType) -> Result<Vec<String>, LoadError> {
        Ok(self
            .list_files(content_type)?
            .iter()
            .map(|name| slug_from_file_name(name).to_string())
            .collect())
    }

    /// Frontmatter of every file, newest first.
    ///
    /// Files with equal dates keep their listing order.
    pub fn all_front_matter(&self, content_type: ContentType) -> Result<Vec<Summary>, LoadError> {
        let dir = self.content_dir(content_type);
        let mut summaries = Vec::new();

        for name in self.list_files(content_type)? {
            let path = dir.join(&name);
            let source = fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            let (front_matter, _) = extract_frontmatter(&source)
                .map_err(|source| LoadError::Frontmatter { path, source })?;

            summaries.push(Summary {
                slug: slug_from_file_name(&name).to_string(),
                front_matter,
            });
        }

        summaries.sort_by(|a, b| newest_first(&a.front_matter, &b.front_matter));

        Ok(summaries)
    }

    /// Load, bundle and annotate the document for `slug`.
    pub fn load(&self, content_type: ContentType, slug: &str) -> Result<Post, LoadError> {
        validate_slug(slug)?;

        let path = self
            .content_dir(content_type)
            .join(format!("{}.{}", slug, CONTENT_EXTENSION));

        let source = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LoadError::NotFound {
                    content_type,
                    slug: slug.to_string(),
                }
            } else {
                LoadError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let files = self.read_support_files()?;

        let output = self
            .bundler
            .bundle(&source, &files)
            .map_err(|source| LoadError::Bundle {
                path: path.clone(),
                source,
            })?;

        let tweet_ids = if content_type.has_tweets() {
            extract_tweet_ids(&source)
        } else {
            Vec::new()
        };

        let estimate = serde_yaml::to_value(reading_time(&source)).map_err(|e| {
            LoadError::Frontmatter {
                path: path.clone(),
                source: FrontmatterError::Serialize(e.to_string()),
            }
        })?;
        let front_matter = output
            .front_matter
            .over([(READING_TIME_KEY.to_string(), estimate)]);

        tracing::debug!(
            "Loaded {} {} ({} tweets)",
            content_type,
            slug,
            tweet_ids.len()
        );

        Ok(Post {
            slug: slug.to_string(),
            content_type,
            bundle: output.bundle,
            front_matter,
            tweet_ids,
        })
    }

    /// Read the support modules, keyed by logical name.
    fn read_support_files(&self) -> Result<IndexMap<String, String>, LoadError> {
        let [scroll_spy_path, theme_context_path] = self.support_paths();

        let read = |path: PathBuf| {
            fs::read_to_string(&path).map_err(|source| LoadError::SupportFile { path, source })
        };

        let mut files = IndexMap::new();
        files.insert(
            SCROLL_SPY_MODULE.to_string(),
            read(scroll_spy_path)?.trim().to_string(),
        );
        files.insert(THEME_CONTEXT_MODULE.to_string(), read(theme_context_path)?);

        Ok(files)
    }
}

/// Slugs name a single file; anything that could step outside the directory is rejected.
fn validate_slug(slug: &str) -> Result<(), LoadError> {
    if slug.is_empty()
        || slug.starts_with('.')
        || slug.contains('/')
        || slug.contains('\\')
        || slug.contains("..")
    {
        return Err(LoadError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    fn fixture() -> (TempDir, ContentLoader) {
        let temp = tempdir().unwrap();
        let root = temp.path();

        let widgets = root.join("core/components/MDX/custom/Widgets");
        fs::create_dir_all(&widgets).unwrap();
        fs::write(
            widgets.join("ScrollSpyWidget.tsx"),
            "\nexport default function ScrollSpyWidget() { return null; }\n\n",
        )
        .unwrap();

        fs::create_dir_all(root.join("core/context")).unwrap();
        fs::write(
            root.join("core/context/ThemeContext.tsx"),
            "export const ThemeContext = { dark: false };\n",
        )
        .unwrap();

        fs::create_dir_all(root.join("content")).unwrap();
        fs::create_dir_all(root.join("snippets")).unwrap();

        let loader = ContentLoader::new(root);
        (temp, loader)
    }

    fn write(loader: &ContentLoader, content_type: ContentType, name: &str, text: &str) {
        fs::write(loader.content_dir(content_type).join(name), text).unwrap();
    }

    #[test]
    fn lists_all_files_sorted() {
        let (_temp, loader) = fixture();
        write(&loader, ContentType::Post, "b-post.mdx", "");
        write(&loader, ContentType::Post, "a-post.mdx", "");
        write(&loader, ContentType::Post, "notes.txt", "");

        let files = loader.list_files(ContentType::Post).unwrap();

        assert_eq!(files, vec!["a-post.mdx", "b-post.mdx", "notes.txt"]);
    }

    #[test]
    fn listing_missing_directory_fails() {
        let temp = tempdir().unwrap();
        let loader = ContentLoader::new(temp.path());

        let result = loader.list_files(ContentType::Snippet);

        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn slugs_strip_extension() {
        let (_temp, loader) = fixture();
        write(&loader, ContentType::Snippet, "curl.mdx", "");

        assert_eq!(loader.slugs(ContentType::Snippet).unwrap(), vec!["curl"]);
    }

    #[test]
    fn front_matter_sorted_newest_first() {
        let (_temp, loader) = fixture();
        write(&loader, ContentType::Post, "a.mdx", "---\ntitle: A\ndate: '2020-01-01'\n---\n");
        write(&loader, ContentType::Post, "b.mdx", "---\ntitle: B\ndate: '2021-06-01'\n---\n");
        write(&loader, ContentType::Post, "c.mdx", "---\ntitle: C\ndate: '2020-01-01'\n---\n");
        write(&loader, ContentType::Post, "d.mdx", "---\ntitle: D\ndate: '2019-12-31'\n---\n");

        let summaries = loader.all_front_matter(ContentType::Post).unwrap();

        let titles: Vec<_> = summaries
            .iter()
            .map(|s| s.front_matter.title().unwrap())
            .collect();
        assert_eq!(titles, vec!["B", "A", "C", "D"]);
        assert_eq!(summaries[0].slug, "b");

        for pair in summaries.windows(2) {
            assert!(pair[0].front_matter.date() >= pair[1].front_matter.date());
        }
    }

    #[test]
    fn loads_minimal_post() {
        let (_temp, loader) = fixture();
        write(
            &loader,
            ContentType::Post,
            "minimal.mdx",
            "---\ntitle: \"T\"\ndate: \"2020-01-01\"\n---\n\nHello there.\n",
        );

        let post = loader.load(ContentType::Post, "minimal").unwrap();

        assert_eq!(post.slug, "minimal");
        assert_eq!(post.front_matter.title(), Some("T"));
        assert!(post.front_matter.contains_key(READING_TIME_KEY));
        assert!(post.tweet_ids.is_empty());
        assert!(post.bundle.code.contains("<p>Hello there.</p>"));

        let keys: Vec<_> = post.front_matter.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec![READING_TIME_KEY, "title", "date"]);
    }

    #[test]
    fn loads_tweet_ids_for_posts() {
        let (_temp, loader) = fixture();
        write(
            &loader,
            ContentType::Post,
            "tweets.mdx",
            "---\ntitle: Tweets\n---\n\n<StaticTweet id=\"111\"/>\n\n<StaticTweet id=\"222\" />\n",
        );

        let post = loader.load(ContentType::Post, "tweets").unwrap();

        assert_eq!(post.tweet_ids, vec!["111", "222"]);
    }

    #[test]
    fn snippets_never_have_tweets() {
        let (_temp, loader) = fixture();
        write(
            &loader,
            ContentType::Snippet,
            "tweets.mdx",
            "---\ntitle: Snip\n---\n\n<StaticTweet id=\"111\" />\n",
        );

        let post = loader.load(ContentType::Snippet, "tweets").unwrap();

        assert!(post.tweet_ids.is_empty());
    }

    #[test]
    fn document_reading_time_wins() {
        let (_temp, loader) = fixture();
        write(
            &loader,
            ContentType::Post,
            "custom.mdx",
            "---\ntitle: T\nreadingTime: quick\n---\nBody\n",
        );

        let post = loader.load(ContentType::Post, "custom").unwrap();

        assert_eq!(post.front_matter.get_str(READING_TIME_KEY), Some("quick"));
    }

    #[test]
    fn missing_slug_is_not_found() {
        let (_temp, loader) = fixture();

        let result = loader.load(ContentType::Post, "nope");

        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn rejects_path_like_slugs() {
        let (_temp, loader) = fixture();

        for slug in ["../secret", "a/b", "", ".hidden"] {
            assert!(matches!(
                loader.load(ContentType::Post, slug),
                Err(LoadError::InvalidSlug(_))
            ));
        }
    }

    #[test]
    fn missing_support_file_fails() {
        let (temp, loader) = fixture();
        fs::remove_file(temp.path().join("core/context/ThemeContext.tsx")).unwrap();
        write(&loader, ContentType::Post, "p.mdx", "# P");

        let result = loader.load(ContentType::Post, "p");

        assert!(matches!(result, Err(LoadError::SupportFile { .. })));
    }

    #[test]
    fn bundle_failure_propagates() {
        let (_temp, loader) = fixture();
        write(&loader, ContentType::Post, "broken.mdx", "<Callout>\n\nno end");

        let result = loader.load(ContentType::Post, "broken");

        assert!(matches!(result, Err(LoadError::Bundle { .. })));
    }

    #[test]
    fn custom_support_locations() {
        let (temp, loader) = fixture();
        fs::create_dir_all(temp.path().join("widgets")).unwrap();
        fs::rename(
            temp.path().join("core/context/ThemeContext.tsx"),
            temp.path().join("widgets/Theme.tsx"),
        )
        .unwrap();
        write(&loader, ContentType::Post, "p.mdx", "# P");

        let loader = loader.with_support_files(SupportFiles {
            theme_context: PathBuf::from("widgets/Theme.tsx"),
            ..SupportFiles::default()
        });

        assert!(loader.load(ContentType::Post, "p").is_ok());
    }
}
