//! Open Graph preview images.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default card background.
pub const DEFAULT_BACKGROUND: &str = "#1a1a1a";

/// Default card text color.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Characters per title line on the card.
const LINE_WIDTH: usize = 28;

/// What an OG image should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OgImageRequest<'a> {
    /// Route segment of the page, such as `posts`
    pub route: &'a str,
    /// Page slug; together with `route` it names the card
    pub slug: &'a str,
    pub title: &'a str,
    pub background: &'a str,
    pub color: &'a str,
}

/// Errors that can occur while generating OG images.
#[derive(Debug, thiserror::Error)]
pub enum OgError {
    #[error("Invalid color \"{0}\"")]
    InvalidColor(String),

    #[error("Invalid OG image name \"{0}\"")]
    InvalidName(String),

    #[error("Failed to write OG image {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Produces a preview image and returns its URL.
pub trait OgImageGenerator: Send + Sync {
    fn generate(&self, request: &OgImageRequest<'_>) -> Result<String, OgError>;
}

/// Writes SVG title cards to `<output_dir>/og/<route>/<slug>.svg`.
#[derive(Debug, Clone)]
pub struct SvgCardGenerator {
    output_dir: PathBuf,
    base_url: String,
    site_title: String,
}

impl SvgCardGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_url: base_url.into(),
            site_title: String::new(),
        }
    }

    /// Print the site title in the card footer.
    pub fn with_site_title(mut self, title: impl Into<String>) -> Self {
        self.site_title = title.into();
        self
    }

    /// Directory the cards are written to.
    pub fn image_dir(&self) -> PathBuf {
        self.output_dir.join("og")
    }

    /// SVG markup for a card.
    pub fn render_svg(&self, request: &OgImageRequest<'_>) -> Result<String, OgError> {
        let background = checked_color(request.background)?;
        let color = checked_color(request.color)?;

        let lines: String = wrap_title(request.title, LINE_WIDTH)
            .iter()
            .enumerate()
            .map(|(i, line)| {
                format!(
                    r#"<tspan x="80" dy="{}">{}</tspan>"#,
                    if i == 0 { 0 } else { 84 },
                    xml_escape(line)
                )
            })
            .collect();

        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="630" viewBox="0 0 1200 630">
<rect width="1200" height="630" fill="{background}"/>
<text x="80" y="220" fill="{color}" font-family="system-ui, sans-serif" font-size="72" font-weight="700">{lines}</text>
<text x="80" y="560" fill="{color}" font-family="system-ui, sans-serif" font-size="32" opacity="0.7">{site}</text>
</svg>
"#,
            site = xml_escape(&self.site_title),
        ))
    }
}

impl OgImageGenerator for SvgCardGenerator {
    fn generate(&self, request: &OgImageRequest<'_>) -> Result<String, OgError> {
        let svg = self.render_svg(request)?;

        let route = path_segment(request.route)?;
        let file_name = format!("{}.svg", path_segment(request.slug)?);

        let dir = self.image_dir().join(route);
        let path = dir.join(&file_name);
        write_file(&dir, &path, &svg)?;

        tracing::debug!("Wrote OG image {}", path.display());

        Ok(format!("{}og/{}/{}", self.base_url, route, file_name))
    }
}

fn write_file(dir: &Path, path: &Path, contents: &str) -> Result<(), OgError> {
    fs::create_dir_all(dir)
        .and_then(|()| fs::write(path, contents))
        .map_err(|source| OgError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// A single path component for a card file.
fn path_segment(segment: &str) -> Result<&str, OgError> {
    if segment.is_empty() || segment == "." || segment == ".." || segment.contains(['/', '\\']) {
        Err(OgError::InvalidName(segment.to_string()))
    } else {
        Ok(segment)
    }
}

/// CSS color functions accepted on cards.
const COLOR_FUNCTIONS: [&str; 4] = ["rgb", "rgba", "hsl", "hsla"];

/// Accept hex colors, plain color names and `rgb()`/`hsl()` style functions.
///
/// Anything that could break out of an SVG attribute is rejected.
fn checked_color(color: &str) -> Result<&str, OgError> {
    let valid = match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => match color.split_once('(') {
            Some((function, rest)) => {
                COLOR_FUNCTIONS.contains(&function.trim_end().to_ascii_lowercase().as_str())
                    && rest.strip_suffix(')').is_some_and(|args| {
                        args.chars().all(|c| {
                            c.is_ascii_alphanumeric() || matches!(c, ',' | '.' | '%' | ' ' | '/' | '-')
                        })
                    })
            }
            None => !color.is_empty() && color.chars().all(|c| c.is_ascii_alphabetic()),
        },
    };

    if valid {
        Ok(color)
    } else {
        Err(OgError::InvalidColor(color.to_string()))
    }
}

/// Greedy word wrap.
fn wrap_title(title: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in title.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn request<'a>(slug: &'a str, title: &'a str) -> OgImageRequest<'a> {
        OgImageRequest {
            route: "posts",
            slug,
            title,
            background: DEFAULT_BACKGROUND,
            color: DEFAULT_COLOR,
        }
    }

    #[test]
    fn writes_card_and_returns_url() {
        let temp = tempdir().unwrap();
        let generator = SvgCardGenerator::new(temp.path(), "/blog/");

        let url = generator.generate(&request("hello", "Hello World")).unwrap();

        assert_eq!(url, "/blog/og/posts/hello.svg");
        let svg = fs::read_to_string(temp.path().join("og/posts/hello.svg")).unwrap();
        assert!(svg.contains(r##"fill="#1a1a1a""##));
        assert!(svg.contains("Hello World"));
    }

    #[test]
    fn escapes_title() {
        let generator = SvgCardGenerator::new("unused", "/");

        let svg = generator.render_svg(&request("tom", "Tom & <Jerry>")).unwrap();

        assert!(svg.contains("Tom &amp; &lt;Jerry&gt;"));
    }

    #[test]
    fn rejects_suspicious_colors() {
        let generator = SvgCardGenerator::new("unused", "/");
        let req = OgImageRequest {
            route: "posts",
            slug: "t",
            title: "T",
            background: r#"red" onload="x"#,
            color: DEFAULT_COLOR,
        };

        assert!(matches!(
            generator.render_svg(&req),
            Err(OgError::InvalidColor(_))
        ));
    }

    #[test]
    fn accepts_named_and_short_colors() {
        assert!(checked_color("rebeccapurple").is_ok());
        assert!(checked_color("#fff").is_ok());
        assert!(checked_color("#ggg").is_err());
    }

    #[test]
    fn accepts_color_functions() {
        assert!(checked_color("rgb(10, 20, 30)").is_ok());
        assert!(checked_color("rgba(10, 20, 30, 0.5)").is_ok());
        assert!(checked_color("hsl(210 50% 40%)").is_ok());
        assert!(checked_color("url(x)").is_err());
        assert!(checked_color(r#"rgb(1,2,3)" onload="x"#).is_err());
    }

    #[test]
    fn same_title_keeps_separate_cards() {
        let temp = tempdir().unwrap();
        let generator = SvgCardGenerator::new(temp.path(), "/");
        let red = OgImageRequest {
            background: "#ff0000",
            ..request("a", "Same")
        };
        let green = OgImageRequest {
            background: "#00ff00",
            ..request("b", "Same")
        };

        let first = generator.generate(&red).unwrap();
        let second = generator.generate(&green).unwrap();

        assert_ne!(first, second);
        let a = fs::read_to_string(temp.path().join("og/posts/a.svg")).unwrap();
        let b = fs::read_to_string(temp.path().join("og/posts/b.svg")).unwrap();
        assert!(a.contains("#ff0000"));
        assert!(b.contains("#00ff00"));
    }

    #[test]
    fn rejects_path_like_slugs() {
        let temp = tempdir().unwrap();
        let generator = SvgCardGenerator::new(temp.path(), "/");

        assert!(matches!(
            generator.generate(&request("../escape", "T")),
            Err(OgError::InvalidName(_))
        ));
    }

    #[test]
    fn wraps_long_titles() {
        let lines = wrap_title("A fairly long title that needs more than one line", 20);

        assert_eq!(
            lines,
            vec!["A fairly long title", "that needs more than", "one line"]
        );
    }
}
