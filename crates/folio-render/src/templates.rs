//! Template engine for rendering blog pages.

use std::fs;
use std::path::PathBuf;

use minijinja::{context, Environment, Error, ErrorKind, Value};
use serde::Serialize;

use folio_mdx::{FrontMatter, TocEntry};

/// Site-wide settings shared by every page.
#[derive(Debug, Clone, Serialize)]
pub struct SiteMeta {
    /// Site title
    pub title: String,
    /// Base URL, always ending in `/`
    pub base_url: String,
    /// Author shown in the footer and meta tags
    pub author: Option<String>,
}

impl SiteMeta {
    pub fn new(title: impl Into<String>, base_url: &str) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            title: title.into(),
            base_url,
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self::new("Blog", "/")
    }
}

/// Context for rendering a post or snippet.
#[derive(Debug, Clone, Serialize)]
pub struct PostContext<'a> {
    pub slug: &'a str,
    /// "post" or "snippet"
    pub kind: &'a str,
    pub title: &'a str,
    pub date: Option<String>,
    pub reading_time: Option<&'a str>,
    pub og_image: &'a str,
    /// Document frontmatter, for custom templates
    pub meta: &'a FrontMatter,
    /// Hydrated document HTML
    pub content: &'a str,
    pub toc: &'a [TocEntry],
}

/// One entry of the index listing.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// Context for rendering the index page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexContext {
    pub posts: Vec<IndexEntry>,
    pub snippets: Vec<IndexEntry>,
}

/// Template engine using minijinja.
///
/// Templates in the optional template directory take precedence over the
/// built-in ones of the same name.
pub struct TemplateEngine {
    env: Environment<'static>,
    live_reload: bool,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        Self::with_template_dir(None)
    }

    /// Create a template engine that looks in `dir` before the built-ins.
    pub fn with_template_dir(dir: Option<PathBuf>) -> Self {
        let mut env = Environment::new();

        env.set_loader(move |name| {
            if let Some(dir) = &dir {
                let path = dir.join(name);
                if path.is_file() {
                    return fs::read_to_string(&path).map(Some).map_err(|e| {
                        Error::new(
                            ErrorKind::InvalidOperation,
                            format!("could not read template {}", path.display()),
                        )
                        .with_source(e)
                    });
                }
            }

            Ok(builtin_template(name).map(str::to_string))
        });

        Self {
            env,
            live_reload: false,
        }
    }

    /// Include the development reload script in every page.
    pub fn with_live_reload(mut self) -> Self {
        self.live_reload = true;
        self
    }

    /// Render a post or snippet.
    pub fn render_post(&self, site: &SiteMeta, page: &PostContext<'_>) -> Result<String, Error> {
        self.render("post.html", site, Value::from_serialize(page))
    }

    /// Render the index listing.
    pub fn render_index(&self, site: &SiteMeta, index: &IndexContext) -> Result<String, Error> {
        self.render("index.html", site, Value::from_serialize(index))
    }

    /// Render the not-found page.
    pub fn render_not_found(&self, site: &SiteMeta) -> Result<String, Error> {
        self.render("404.html", site, Value::UNDEFINED)
    }

    fn render(&self, template: &str, site: &SiteMeta, page: Value) -> Result<String, Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            site => site,
            page => page,
            live_reload => self.live_reload,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "base.html" => Some(BASE_TEMPLATE),
        "post.html" => Some(POST_TEMPLATE),
        "index.html" => Some(INDEX_TEMPLATE),
        "404.html" => Some(NOT_FOUND_TEMPLATE),
        _ => None,
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{{ site.title }}{% endblock %}</title>
  {% if site.author %}<meta name="author" content="{{ site.author }}">{% endif %}
  {% block meta %}{% endblock %}
  <link rel="stylesheet" href="{{ site.base_url }}assets/main.css">
</head>
<body>
  <header class="site-header">
    <a href="{{ site.base_url }}" class="site-title">{{ site.title }}</a>
    <button type="button" class="theme-toggle" aria-label="Toggle theme">&#9680;</button>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
  <footer class="site-footer">
    {% if site.author %}&copy; {{ site.author }}{% endif %}
  </footer>
  <script src="{{ site.base_url }}assets/main.js"></script>
  {% if live_reload %}<script src="/__reload.js"></script>{% endif %}
</body>
</html>"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}{{ page.title }} - {{ site.title }}{% endblock %}

{% block meta %}
  <meta property="og:title" content="{{ page.title }}">
  <meta property="og:type" content="article">
  <meta property="og:image" content="{{ page.og_image }}">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:image" content="{{ page.og_image }}">
  {% if page.meta.description %}<meta name="description" content="{{ page.meta.description }}">{% endif %}
{% endblock %}

{% block content %}
<article class="{{ page.kind }}">
  <header class="post-header">
    <h1>{{ page.title }}</h1>
    <p class="post-meta">
      {% if page.date %}<time datetime="{{ page.date }}">{{ page.date }}</time>{% endif %}
      {% if page.reading_time %}<span class="reading-time">{{ page.reading_time }}</span>{% endif %}
    </p>
  </header>
  <div class="content">
    {{ page.content | safe }}
  </div>
</article>
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="listing">
  <h2>Posts</h2>
  <ul class="post-list">
  {% for post in page.posts %}
    <li>
      <a href="{{ post.url }}">{{ post.title }}</a>
      {% if post.date %}<time datetime="{{ post.date }}">{{ post.date }}</time>{% endif %}
      {% if post.description %}<p>{{ post.description }}</p>{% endif %}
    </li>
  {% else %}
    <li class="empty">Nothing here yet.</li>
  {% endfor %}
  </ul>
</section>
{% if page.snippets %}
<section class="listing">
  <h2>Snippets</h2>
  <ul class="post-list">
  {% for snippet in page.snippets %}
    <li><a href="{{ snippet.url }}">{{ snippet.title }}</a></li>
  {% endfor %}
  </ul>
</section>
{% endif %}
{% endblock %}"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}Not found - {{ site.title }}{% endblock %}

{% block content %}
<section class="not-found">
  <h1>Page not found</h1>
  <p><a href="{{ site.base_url }}">Back to all posts</a></p>
</section>
{% endblock %}"##;
