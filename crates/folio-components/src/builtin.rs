//! Components every blog post can use.

use crate::inline::{html_escape, InlineJsx};
use crate::traits::{ComponentError, MdxComponent, RenderContext};
use crate::tweet::{status_url, Tweet};

/// All built-in components.
pub fn builtins() -> Vec<Box<dyn MdxComponent>> {
    vec![
        Box::new(StaticTweet),
        Box::new(Callout),
        Box::new(Pill),
        Box::new(Button),
        Box::new(Image),
        Box::new(VideoPlayer),
        Box::new(HighlightSection),
        Box::new(ScrollSpyWidget),
    ]
}

fn required<'a>(
    element: &'a InlineJsx,
    component: &'static str,
    prop: &'static str,
) -> Result<&'a str, ComponentError> {
    element
        .prop(prop)
        .ok_or(ComponentError::MissingProp { component, prop })
}

/// Reduce a prop to a safe class name fragment.
fn class_token(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

fn optional_attr(name: &str, value: Option<&str>) -> String {
    value
        .map(|v| format!(r#" {}="{}""#, name, html_escape(v)))
        .unwrap_or_default()
}

/// `<StaticTweet id="..." />`: a tweet fetched at build time.
pub struct StaticTweet;

impl MdxComponent for StaticTweet {
    fn name(&self) -> &'static str {
        "StaticTweet"
    }

    fn render(
        &self,
        element: &InlineJsx,
        _children: Option<&str>,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        let id = required(element, self.name(), "id")?;

        match ctx.tweets.get(id) {
            Some(tweet) => Ok(render_tweet(tweet)),
            None => {
                tracing::warn!("Tweet {} was not fetched, rendering a link instead", id);
                Ok(format!(
                    r#"<blockquote class="tweet tweet-unavailable" data-tweet-id="{id}"><a href="{url}">View this tweet</a></blockquote>"#,
                    id = html_escape(id),
                    url = status_url(&html_escape(id)),
                ))
            }
        }
    }
}

fn render_tweet(tweet: &Tweet) -> String {
    let avatar = tweet
        .author
        .profile_image_url
        .as_deref()
        .map(|src| {
            format!(
                r#"<img class="tweet-avatar" src="{}" alt="" width="48" height="48" loading="lazy" />"#,
                html_escape(src)
            )
        })
        .unwrap_or_default();

    let verified = if tweet.author.verified {
        r#"<span class="tweet-verified" title="Verified account">✓</span>"#
    } else {
        ""
    };

    let text = html_escape(&tweet.text).replace('\n', "<br />");
    let date = tweet.created_at.as_deref().unwrap_or("View on Twitter");

    format!(
        r#"<blockquote class="tweet" data-tweet-id="{id}">
<div class="tweet-author">{avatar}<span class="tweet-name">{name}</span>{verified} <a class="tweet-username" href="https://twitter.com/{username}">@{username}</a></div>
<p class="tweet-text">{text}</p>
<div class="tweet-meta"><a href="{url}">{date}</a> <span>{replies} replies</span> <span>{retweets} retweets</span> <span>{likes} likes</span></div>
</blockquote>"#,
        id = html_escape(&tweet.id),
        name = html_escape(&tweet.author.name),
        username = html_escape(&tweet.author.username),
        url = html_escape(&tweet.permalink()),
        date = html_escape(date),
        replies = tweet.replies,
        retweets = tweet.retweets,
        likes = tweet.likes,
    )
}

/// `<Callout variant="info">...</Callout>`
pub struct Callout;

impl MdxComponent for Callout {
    fn name(&self) -> &'static str {
        "Callout"
    }

    fn render(
        &self,
        element: &InlineJsx,
        children: Option<&str>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        let variant = class_token(element.prop("variant").unwrap_or("info"));
        Ok(format!(
            r#"<div class="callout callout-{}" role="note">{}</div>"#,
            variant,
            children.unwrap_or_default()
        ))
    }
}

/// `<Pill variant="success">New</Pill>`
pub struct Pill;

impl MdxComponent for Pill {
    fn name(&self) -> &'static str {
        "Pill"
    }

    fn render(
        &self,
        element: &InlineJsx,
        children: Option<&str>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        let variant = class_token(element.prop("variant").unwrap_or("info"));
        Ok(format!(
            r#"<span class="pill pill-{}">{}</span>"#,
            variant,
            children.unwrap_or_default()
        ))
    }
}

/// `<Button href="...">Label</Button>`; a link when `href` is set.
pub struct Button;

impl MdxComponent for Button {
    fn name(&self) -> &'static str {
        "Button"
    }

    fn render(
        &self,
        element: &InlineJsx,
        children: Option<&str>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        let variant = class_token(element.prop("variant").unwrap_or("primary"));
        let label = children.unwrap_or_default();

        Ok(match element.prop("href") {
            Some(href) => format!(
                r#"<a class="button button-{}" href="{}">{}</a>"#,
                variant,
                html_escape(href),
                label
            ),
            None => format!(
                r#"<button type="button" class="button button-{}"{}>{}</button>"#,
                variant,
                if element.flag("disabled") { " disabled" } else { "" },
                label
            ),
        })
    }
}

/// `<Image src="..." alt="..." caption="..." />`
pub struct Image;

impl MdxComponent for Image {
    fn name(&self) -> &'static str {
        "Image"
    }

    fn render(
        &self,
        element: &InlineJsx,
        _children: Option<&str>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        let src = required(element, self.name(), "src")?;
        let alt = element.prop("alt").unwrap_or_default();

        let caption = element
            .prop("caption")
            .map(|c| format!("<figcaption>{}</figcaption>", html_escape(c)))
            .unwrap_or_default();

        Ok(format!(
            r#"<figure class="image"><img src="{}" alt="{}"{}{} loading="lazy" />{}</figure>"#,
            html_escape(src),
            html_escape(alt),
            optional_attr("width", element.prop("width")),
            optional_attr("height", element.prop("height")),
            caption
        ))
    }
}

/// `<VideoPlayer src="..." poster="..." />`
pub struct VideoPlayer;

impl MdxComponent for VideoPlayer {
    fn name(&self) -> &'static str {
        "VideoPlayer"
    }

    fn render(
        &self,
        element: &InlineJsx,
        _children: Option<&str>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        let src = required(element, self.name(), "src")?;

        Ok(format!(
            r#"<video class="video-player" src="{}"{} controls playsinline preload="metadata"></video>"#,
            html_escape(src),
            optional_attr("poster", element.prop("poster"))
        ))
    }
}

/// `<HighlightSection>...</HighlightSection>`
pub struct HighlightSection;

impl MdxComponent for HighlightSection {
    fn name(&self) -> &'static str {
        "HighlightSection"
    }

    fn render(
        &self,
        _element: &InlineJsx,
        children: Option<&str>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        Ok(format!(
            r#"<div class="highlight-section">{}</div>"#,
            children.unwrap_or_default()
        ))
    }
}

/// `<ScrollSpyWidget />`: the page outline with in-page links.
pub struct ScrollSpyWidget;

impl MdxComponent for ScrollSpyWidget {
    fn name(&self) -> &'static str {
        "ScrollSpyWidget"
    }

    fn render(
        &self,
        _element: &InlineJsx,
        _children: Option<&str>,
        ctx: &RenderContext<'_>,
    ) -> Result<String, ComponentError> {
        if ctx.toc.is_empty() {
            return Ok(String::new());
        }

        let items: String = ctx
            .toc
            .iter()
            .map(|entry| {
                format!(
                    r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
                    entry.level,
                    html_escape(&entry.id),
                    html_escape(&entry.title)
                )
            })
            .collect();

        Ok(format!(
            r#"<nav class="scroll-spy" aria-label="Table of contents"><ul>{}</ul></nav>"#,
            items
        ))
    }
}
