//! Markdown transforms applied before the document is compiled.
//!
//! Each plugin rewrites the pulldown-cmark event stream. They run in the order
//! returned by [`default_plugins`]: heading slugs, heading anchors, sections,
//! then figures.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::bundler::TAG_RE;

/// A transform over the markdown event stream.
pub trait RemarkPlugin: Send + Sync {
    /// Plugin identifier used in errors and logs
    fn name(&self) -> &'static str;

    /// Rewrite the events of one document.
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, PluginError>;
}

/// Error raised by a plugin. Aborts the bundle.
#[derive(Debug, thiserror::Error)]
#[error("Plugin {plugin} failed: {message}")]
pub struct PluginError {
    pub plugin: &'static str,
    pub message: String,
}

/// The plugin pipeline used for every document.
pub fn default_plugins() -> Vec<Box<dyn RemarkPlugin>> {
    vec![
        Box::new(HeadingSlugs),
        Box::new(AutolinkHeadings),
        Box::new(Sectionize),
        Box::new(Figures),
    ]
}

/// Assigns GitHub-style `id`s to headings that do not already have one.
#[derive(Debug, Default)]
pub struct HeadingSlugs;

impl RemarkPlugin for HeadingSlugs {
    fn name(&self) -> &'static str {
        "slug"
    }

    fn transform<'a>(&self, mut events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, PluginError> {
        let mut slugger = Slugger::default();

        for idx in 0..events.len() {
            if let Event::Start(Tag::Heading { id: Some(existing), .. }) = &events[idx] {
                slugger.reserve(existing);
                continue;
            }

            if !matches!(&events[idx], Event::Start(Tag::Heading { id: None, .. })) {
                continue;
            }

            let slug = slugger.slug(&heading_text(&events[idx + 1..]));
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[idx] {
                *id = Some(CowStr::from(slug));
            }
        }

        Ok(events)
    }
}

/// Prepends a self-link anchor to every heading that has an `id`.
#[derive(Debug, Default)]
pub struct AutolinkHeadings;

impl RemarkPlugin for AutolinkHeadings {
    fn name(&self) -> &'static str {
        "autolink-headings"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, PluginError> {
        let mut out = Vec::with_capacity(events.len());

        for event in events {
            let anchor = match &event {
                Event::Start(Tag::Heading { id: Some(id), .. }) => Some(format!(
                    r##"<a aria-hidden="true" tabindex="-1" href="#{}"><span class="icon icon-link"></span></a>"##,
                    escape_html(id)
                )),
                _ => None,
            };

            out.push(event);
            if let Some(anchor) = anchor {
                out.push(Event::InlineHtml(CowStr::from(anchor)));
            }
        }

        Ok(out)
    }
}

/// Wraps each top-level heading and the content that follows it in `<section>`.
///
/// A section runs until the next heading of the same or higher rank; deeper
/// headings open nested sections. Headings inside a component block belong to
/// that component and are left alone.
#[derive(Debug, Default)]
pub struct Sectionize;

impl RemarkPlugin for Sectionize {
    fn name(&self) -> &'static str {
        "sectionize"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, PluginError> {
        let mut out = Vec::with_capacity(events.len() + 8);
        let mut open: Vec<u8> = Vec::new();
        let mut depth = 0usize;
        let mut components = 0usize;

        for event in events {
            if let Event::Start(Tag::Heading { level, .. }) = &event {
                if depth == 0 && components == 0 {
                    let level = *level as u8;
                    while open.last().is_some_and(|top| *top >= level) {
                        open.pop();
                        out.push(Event::Html(CowStr::Borrowed("</section>\n")));
                    }
                    out.push(Event::Html(CowStr::Borrowed("<section>\n")));
                    open.push(level);
                }
            }

            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Html(html) | Event::InlineHtml(html) => {
                    components = component_depth(components, html);
                }
                _ => {}
            }

            out.push(event);
        }

        for _ in open {
            out.push(Event::Html(CowStr::Borrowed("</section>\n")));
        }

        Ok(out)
    }
}

/// Component nesting after the tags found in one HTML chunk.
fn component_depth(depth: usize, html: &str) -> usize {
    TAG_RE.captures_iter(html).fold(depth, |depth, caps| {
        if !caps[1].is_empty() {
            depth.saturating_sub(1)
        } else if caps[4].is_empty() {
            depth + 1
        } else {
            depth
        }
    })
}

/// Turns a paragraph holding a single image into a `<figure>`.
///
/// The caption is the image title, falling back to its alt text.
#[derive(Debug, Default)]
pub struct Figures;

impl RemarkPlugin for Figures {
    fn name(&self) -> &'static str {
        "figure"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, PluginError> {
        let mut out = Vec::with_capacity(events.len());
        let mut idx = 0;

        while idx < events.len() {
            if let Some((end, figure)) = self.match_figure(&events, idx)? {
                out.push(Event::Html(CowStr::from(figure)));
                idx = end + 1;
            } else {
                out.push(events[idx].clone());
                idx += 1;
            }
        }

        Ok(out)
    }
}

impl Figures {
    /// Match `Paragraph > Image` with nothing else in the paragraph.
    ///
    /// Returns the index of the closing paragraph event and the figure markup.
    fn match_figure(
        &self,
        events: &[Event<'_>],
        start: usize,
    ) -> Result<Option<(usize, String)>, PluginError> {
        if !matches!(events.get(start), Some(Event::Start(Tag::Paragraph))) {
            return Ok(None);
        }

        let Some(Event::Start(Tag::Image {
            dest_url, title, ..
        })) = events.get(start + 1)
        else {
            return Ok(None);
        };

        let mut alt = String::new();
        let mut idx = start + 2;
        loop {
            match events.get(idx) {
                Some(Event::End(TagEnd::Image)) => break,
                Some(Event::Text(text)) | Some(Event::Code(text)) => alt.push_str(text),
                Some(Event::SoftBreak) | Some(Event::HardBreak) => alt.push(' '),
                Some(_) => {}
                None => return Ok(None),
            }
            idx += 1;
        }

        if !matches!(events.get(idx + 1), Some(Event::End(TagEnd::Paragraph))) {
            return Ok(None);
        }

        if dest_url.trim().is_empty() {
            return Err(PluginError {
                plugin: self.name(),
                message: format!("image '{}' has no source", alt),
            });
        }

        let caption = if title.is_empty() { alt.as_str() } else { &**title };
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };

        let mut figure = format!(
            r#"<figure><img src="{}" alt="{}"{} />"#,
            escape_html(dest_url),
            escape_html(&alt),
            title_attr
        );
        if !caption.is_empty() {
            figure.push_str(&format!("<figcaption>{}</figcaption>", escape_html(caption)));
        }
        figure.push_str("</figure>\n");

        Ok(Some((idx + 1, figure)))
    }
}

/// Collect the plain text of a heading from the events following its start.
pub(crate) fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Generates unique heading slugs within one document.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Slug `text`, suffixing `-1`, `-2`, ... when it was already taken.
    pub fn slug(&mut self, text: &str) -> String {
        let original = slugify(text);
        let mut result = original.clone();

        while self.occurrences.contains_key(&result) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            result = format!("{}-{}", original, count);
        }

        self.occurrences.insert(result.clone(), 0);
        result
    }

    /// Mark an explicit id as taken.
    pub fn reserve(&mut self, id: &str) {
        self.occurrences.entry(id.to_string()).or_insert(0);
    }
}

/// Convert a heading to a URL-safe slug.
///
/// Letters, digits, `-` and `_` are kept (lowercased), whitespace becomes `-`,
/// everything else is dropped.
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{html, Parser};

    fn run(plugins: &[Box<dyn RemarkPlugin>], markdown: &str) -> String {
        let mut events: Vec<Event> = Parser::new(markdown).collect();
        for plugin in plugins {
            events = plugin.transform(events).unwrap();
        }
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("What's new in 2.0?"), "whats-new-in-20");
    }

    #[test]
    fn slugger_dedups() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("Intro"), "intro");
        assert_eq!(slugger.slug("Intro"), "intro-1");
        assert_eq!(slugger.slug("Intro"), "intro-2");
        assert_eq!(slugger.slug("Intro 1"), "intro-1-1");
    }

    #[test]
    fn assigns_heading_ids() {
        let html = run(&[Box::new(HeadingSlugs)], "# Hello World\n\n## Hello World");

        assert!(html.contains(r#"<h1 id="hello-world">"#));
        assert!(html.contains(r#"<h2 id="hello-world-1">"#));
    }

    #[test]
    fn links_headings() {
        let html = run(
            &[Box::new(HeadingSlugs), Box::new(AutolinkHeadings)],
            "## Setup",
        );

        assert!(html.contains(r##"<h2 id="setup"><a aria-hidden="true" tabindex="-1" href="#setup">"##));
    }

    #[test]
    fn nests_sections() {
        let html = run(
            &[Box::new(Sectionize)],
            "# One\n\nA\n\n## Two\n\nB\n\n# Three\n\nC",
        );

        let compact: String = html.split_whitespace().collect();
        assert_eq!(
            compact,
            "<section><h1>One</h1><p>A</p><section><h2>Two</h2><p>B</p></section></section>\
             <section><h1>Three</h1><p>C</p></section>"
        );
    }

    #[test]
    fn ignores_headings_in_blockquotes_for_sections() {
        let html = run(&[Box::new(Sectionize)], "> # Quoted\n\nText");

        assert!(!html.contains("<section>"));
    }

    #[test]
    fn leaves_headings_inside_components() {
        let html = run(
            &[Box::new(Sectionize)],
            "<Callout>\n\n## Inside\n\ntext\n\n</Callout>\n\n## After\n\nmore\n",
        );

        let compact: String = html.split_whitespace().collect();
        assert_eq!(
            compact,
            "<Callout><h2>Inside</h2><p>text</p></Callout>\
             <section><h2>After</h2><p>more</p></section>"
        );
    }

    #[test]
    fn self_closing_components_do_not_nest() {
        let html = run(&[Box::new(Sectionize)], "<Pill text=\"x\" />\n\n## After\n");

        assert!(html.contains("<section>"));
    }

    #[test]
    fn wraps_lone_images_in_figures() {
        let html = run(
            &[Box::new(Figures)],
            "![A cat](/cat.png \"My cat\")\n\nText with ![inline](/i.png) image",
        );

        assert!(html.contains(
            r#"<figure><img src="/cat.png" alt="A cat" title="My cat" /><figcaption>My cat</figcaption></figure>"#
        ));
        assert!(html.contains(r#"<p>Text with <img src="/i.png" alt="inline" /> image</p>"#));
    }

    #[test]
    fn figure_caption_falls_back_to_alt() {
        let html = run(&[Box::new(Figures)], "![Sunset](/sunset.jpg)");

        assert!(html.contains("<figcaption>Sunset</figcaption>"));
    }

    #[test]
    fn figure_without_source_fails() {
        let events: Vec<Event> = Parser::new("![Broken]()").collect();

        let err = Figures.transform(events).unwrap_err();
        assert_eq!(err.plugin, "figure");
    }
}
