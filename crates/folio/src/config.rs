//! Configuration file (folio.toml).

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use folio_mdx::{ContentLoader, SupportFiles};
use folio_render::og::{DEFAULT_BACKGROUND, DEFAULT_COLOR};
use folio_render::{
    ArchiveTweetSource, OgColors, PostPage, SiteMeta, SvgCardGenerator, TemplateEngine,
};

/// Environment variable overriding `content.root`.
pub const ROOT_ENV: &str = "FOLIO_ROOT";

/// Configuration file structure.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub content: ContentConfig,
    pub build: BuildSettings,
    pub tweets: TweetsConfig,
    pub og: OgConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub base_url: String,
    pub author: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            base_url: "/".to_string(),
            author: None,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Blog root holding `content/` and `snippets/`
    pub root: PathBuf,
    /// Scroll-spy widget module, relative to the root
    pub scroll_spy: PathBuf,
    /// Theme context module, relative to the root
    pub theme_context: PathBuf,
    /// Directory of templates overriding the built-in ones
    pub templates: Option<PathBuf>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        let support = SupportFiles::default();
        Self {
            root: PathBuf::from("."),
            scroll_spy: support.scroll_spy,
            theme_context: support.theme_context,
            templates: None,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildSettings {
    pub output: PathBuf,
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist"),
            minify: true,
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TweetsConfig {
    /// JSON archive of tweets used for static embeds
    pub archive: Option<PathBuf>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct OgConfig {
    pub background: String,
    pub color: String,
}

impl Default for OgConfig {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path` if it exists.
    ///
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Blog root, honoring the `FOLIO_ROOT` override.
    pub fn root(&self) -> PathBuf {
        self.resolve_root(env::var_os(ROOT_ENV))
    }

    fn resolve_root(&self, overridden: Option<OsString>) -> PathBuf {
        match overridden {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => self.content.root.clone(),
        }
    }

    pub fn support_files(&self) -> SupportFiles {
        SupportFiles {
            scroll_spy: self.content.scroll_spy.clone(),
            theme_context: self.content.theme_context.clone(),
        }
    }

    pub fn loader(&self) -> ContentLoader {
        ContentLoader::new(self.root()).with_support_files(self.support_files())
    }

    pub fn site(&self) -> SiteMeta {
        let site = SiteMeta::new(&self.site.title, &self.site.base_url);
        match &self.site.author {
            Some(author) => site.with_author(author),
            None => site,
        }
    }

    /// OG card generator writing below `output_dir`.
    pub fn og_generator(&self, output_dir: &Path) -> SvgCardGenerator {
        let site = self.site();
        SvgCardGenerator::new(output_dir, site.base_url).with_site_title(site.title)
    }

    /// Page renderer for this blog, writing OG cards below `output_dir`.
    pub fn page(&self, output_dir: &Path, live_reload: bool) -> PostPage {
        let mut templates = TemplateEngine::with_template_dir(self.content.templates.clone());
        if live_reload {
            templates = templates.with_live_reload();
        }

        let page = PostPage::new(self.loader(), Box::new(self.og_generator(output_dir)))
            .with_site(self.site())
            .with_templates(templates)
            .with_og_colors(OgColors {
                background: self.og.background.clone(),
                color: self.og.color.clone(),
            });

        match &self.tweets.archive {
            Some(archive) => page.with_tweets(Box::new(ArchiveTweetSource::new(archive))),
            None => page,
        }
    }
}
