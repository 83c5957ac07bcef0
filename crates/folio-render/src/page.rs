//! Building a single page from a content file.
//!
//! [`PostPage::build`] is the boundary between the content pipeline and
//! whatever serves pages: every failure below it is logged and turned into
//! [`PageOutcome::NotFound`].

use indexmap::IndexMap;

use folio_components::{ComponentError, ComponentRegistry, RenderContext};
use folio_mdx::loader::READING_TIME_KEY;
use folio_mdx::{ContentLoader, ContentType, LoadError, Summary};

use crate::og::{OgError, OgImageGenerator, OgImageRequest, DEFAULT_BACKGROUND, DEFAULT_COLOR};
use crate::templates::{IndexContext, IndexEntry, PostContext, SiteMeta, TemplateEngine};
use crate::tweets::{NoTweets, TweetError, TweetSource};

/// Result of building a page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Rendered HTML
    Found(String),
    /// Nothing can be shown for this page
    NotFound,
}

impl PageOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PageOutcome::Found(_))
    }
}

/// Errors that can occur while rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to fetch tweets: {0}")]
    Tweets(#[from] TweetError),

    #[error("Failed to generate OG image: {0}")]
    OgImage(#[from] OgError),

    #[error("Failed to render components: {0}")]
    Component(#[from] ComponentError),

    #[error("Failed to render template: {0}")]
    Template(#[from] minijinja::Error),
}

/// Card colors used when a document does not set its own.
#[derive(Debug, Clone, PartialEq)]
pub struct OgColors {
    pub background: String,
    pub color: String,
}

impl Default for OgColors {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Everything needed to turn a slug into a page.
pub struct PostPage {
    loader: ContentLoader,
    tweets: Box<dyn TweetSource>,
    og: Box<dyn OgImageGenerator>,
    og_colors: OgColors,
    components: ComponentRegistry,
    templates: TemplateEngine,
    site: SiteMeta,
}

impl PostPage {
    /// Create a page builder with the built-in components and templates and
    /// no tweet source.
    pub fn new(loader: ContentLoader, og: Box<dyn OgImageGenerator>) -> Self {
        Self {
            loader,
            tweets: Box::new(NoTweets),
            og,
            og_colors: OgColors::default(),
            components: ComponentRegistry::with_builtins(),
            templates: TemplateEngine::new(),
            site: SiteMeta::default(),
        }
    }

    pub fn with_tweets(mut self, tweets: Box<dyn TweetSource>) -> Self {
        self.tweets = tweets;
        self
    }

    pub fn with_og_colors(mut self, colors: OgColors) -> Self {
        self.og_colors = colors;
        self
    }

    pub fn with_components(mut self, components: ComponentRegistry) -> Self {
        self.components = components;
        self
    }

    pub fn with_templates(mut self, templates: TemplateEngine) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_site(mut self, site: SiteMeta) -> Self {
        self.site = site;
        self
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    pub fn site(&self) -> &SiteMeta {
        &self.site
    }

    /// URL of a page relative to the site root.
    pub fn url(&self, content_type: ContentType, slug: &str) -> String {
        format!("{}{}/{}/", self.site.base_url, content_type.route(), slug)
    }

    /// Build the page for `slug`.
    pub fn build(&self, content_type: ContentType, slug: &str) -> PageOutcome {
        match self.render(content_type, slug) {
            Ok(html) => PageOutcome::Found(html),
            Err(e) => {
                tracing::error!("Could not build {} \"{}\": {}", content_type, slug, e);
                PageOutcome::NotFound
            }
        }
    }

    /// Render `slug`, reporting what went wrong.
    pub fn render(&self, content_type: ContentType, slug: &str) -> Result<String, RenderError> {
        let post = self.loader.load(content_type, slug)?;

        let tweets = if post.tweet_ids.is_empty() {
            IndexMap::new()
        } else {
            self.tweets.fetch(&post.tweet_ids)?
        };

        let meta = &post.front_matter;
        let title = meta.title().unwrap_or(slug);

        let og_image = self.og.generate(&OgImageRequest {
            route: content_type.route(),
            slug,
            title,
            background: meta
                .color_featured()
                .unwrap_or(self.og_colors.background.as_str()),
            color: meta
                .font_featured()
                .unwrap_or(self.og_colors.color.as_str()),
        })?;

        let ctx = RenderContext {
            tweets: &tweets,
            toc: &post.bundle.toc,
        };
        let content = self.components.hydrate(&post.bundle.code, &ctx)?;

        let reading_time = meta
            .get(READING_TIME_KEY)
            .and_then(|estimate| estimate.get("text"))
            .and_then(|text| text.as_str());

        let html = self.templates.render_post(
            &self.site,
            &PostContext {
                slug,
                kind: match content_type {
                    ContentType::Post => "post",
                    ContentType::Snippet => "snippet",
                },
                title,
                date: meta.date(),
                reading_time,
                og_image: &og_image,
                meta,
                content: &content,
                toc: &post.bundle.toc,
            },
        )?;

        Ok(html)
    }

    /// Render the index listing of posts and snippets, newest first.
    pub fn render_index(&self) -> Result<String, RenderError> {
        let index = IndexContext {
            posts: self.entries(ContentType::Post)?,
            snippets: self.entries(ContentType::Snippet)?,
        };

        Ok(self.templates.render_index(&self.site, &index)?)
    }

    /// Render the not-found page.
    pub fn render_not_found(&self) -> Result<String, RenderError> {
        Ok(self.templates.render_not_found(&self.site)?)
    }

    fn entries(&self, content_type: ContentType) -> Result<Vec<IndexEntry>, RenderError> {
        let summaries = allow_missing_snippets(
            content_type,
            self.loader.all_front_matter(content_type),
        )?;

        Ok(summaries
            .into_iter()
            .map(|Summary { slug, front_matter }| IndexEntry {
                url: self.url(content_type, &slug),
                title: front_matter.title().unwrap_or(&slug).to_string(),
                date: front_matter.date(),
                description: front_matter.get_str("description").map(str::to_string),
                slug,
            })
            .collect())
    }
}

/// Treat a missing snippets directory as empty.
///
/// Posts are required; a blog without snippets is common.
pub(crate) fn allow_missing_snippets<T>(
    content_type: ContentType,
    result: Result<Vec<T>, LoadError>,
) -> Result<Vec<T>, LoadError> {
    match result {
        Err(LoadError::Io { path, source })
            if content_type == ContentType::Snippet
                && source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::debug!("No snippets directory at {}", path.display());
            Ok(Vec::new())
        }
        other => other,
    }
}
