//! Inline JSX parser for compiled MDX.
//!
//! Parses component tags like `<Callout variant="info">Careful</Callout>` left in
//! compiled documents to extract component name, props, and children.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Parsed inline JSX element.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineJsx {
    /// Component name (e.g., "Callout")
    pub component: String,

    /// Props as key-value pairs, in source order
    pub props: IndexMap<String, PropValue>,

    /// Children content (markup as string)
    pub children: Option<String>,

    /// Whether self-closing
    pub self_closing: bool,
}

/// A prop value from JSX.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// String literal: variant="default"
    String(String),
    /// Boolean (presence): disabled
    Boolean(bool),
    /// Expression: onClick={handler}
    Expression(String),
}

impl PropValue {
    /// Get as string if it's a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl InlineJsx {
    /// Look up a prop given as a string or expression.
    pub fn prop(&self, name: &str) -> Option<&str> {
        match self.props.get(name)? {
            PropValue::String(s) | PropValue::Expression(s) => Some(s),
            PropValue::Boolean(_) => None,
        }
    }

    /// Whether a boolean prop is present and true.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.props.get(name), Some(PropValue::Boolean(true)))
    }
}

/// One attribute: `name`, `name="v"`, `name='v'` or `name={v}`.
const ATTR: &str = r#"\s+[A-Za-z][A-Za-z0-9_-]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^}]*\}))?"#;

/// Parse inline JSX source code.
///
/// Returns the first top-level JSX element found at the start of `source`.
pub fn parse_inline_jsx(source: &str) -> Option<InlineJsx> {
    parse_element(source.trim()).map(|(jsx, _)| jsx)
}

/// Parse the element at the very start of `source`.
///
/// Returns the element and the number of bytes it spans.
pub fn parse_element(source: &str) -> Option<(InlineJsx, usize)> {
    // Try self-closing first: <Component prop="value" />
    if let Some(found) = parse_self_closing(source) {
        return Some(found);
    }

    // Try with children: <Component>children</Component>
    parse_with_children(source)
}

/// Parse a self-closing JSX element.
fn parse_self_closing(source: &str) -> Option<(InlineJsx, usize)> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!(r"^<([A-Z][a-zA-Z0-9]*)((?:{ATTR})*)\s*/>"))
            .expect("Invalid self-closing regex")
    });

    let caps = RE.captures(source)?;
    let component = caps.get(1)?.as_str().to_string();
    let props_str = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    Some((
        InlineJsx {
            component,
            props: parse_props(props_str),
            children: None,
            self_closing: true,
        },
        caps.get(0)?.len(),
    ))
}

/// Find the matching closing tag position, handling nested same-name components.
fn find_matching_close_tag(source: &str, component: &str, start_pos: usize) -> Option<usize> {
    let open_pattern = format!("<{}", component);
    let close_tag = format!("</{}>", component);

    let remaining = &source[start_pos..];
    let mut depth = 1;
    let mut pos = 0;

    while depth > 0 && pos < remaining.len() {
        // Look for next open or close tag
        let next_open = remaining[pos..].find(&open_pattern);
        let next_close = remaining[pos..].find(&close_tag);

        match (next_open, next_close) {
            (Some(o), Some(c)) if o < c => {
                let tag_start = pos + o;
                let after_name = &remaining[tag_start + open_pattern.len()..];
                let tag_end = after_name.find('>').unwrap_or(after_name.len());
                let tag_body = &after_name[..tag_end];

                if tag_body.trim_end().ends_with('/') {
                    // Self-closing, skip it
                    pos = tag_start + open_pattern.len();
                } else if after_name.starts_with('>')
                    || after_name.starts_with(char::is_whitespace)
                {
                    // Opening tag, increment depth
                    depth += 1;
                    pos = tag_start + open_pattern.len();
                } else {
                    // Longer name sharing the prefix, skip
                    pos = tag_start + 1;
                }
            }
            (_, Some(c)) => {
                depth -= 1;
                if depth == 0 {
                    return Some(start_pos + pos + c);
                }
                pos += c + close_tag.len();
            }
            (_, None) => {
                // No more close tags
                return None;
            }
        }
    }

    None
}

/// Parse a JSX element with children.
fn parse_with_children(source: &str) -> Option<(InlineJsx, usize)> {
    static OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!(r"^<([A-Z][a-zA-Z0-9]*)((?:{ATTR})*)\s*>"))
            .expect("Invalid open tag regex")
    });

    let open_caps = OPEN_RE.captures(source)?;
    let component = open_caps.get(1)?.as_str().to_string();
    let props_str = open_caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let open_len = open_caps.get(0)?.len();

    // Find matching close tag (handles nested same-name components)
    let close_pos = find_matching_close_tag(source, &component, open_len)?;
    let consumed = close_pos + component.len() + 3;

    let children = source[open_len..close_pos].trim();
    let children = if children.is_empty() {
        None
    } else {
        Some(children.to_string())
    };

    Some((
        InlineJsx {
            component,
            props: parse_props(props_str),
            children,
            self_closing: false,
        },
        consumed,
    ))
}

/// Parse props from a props string.
fn parse_props(props_str: &str) -> IndexMap<String, PropValue> {
    let mut props = IndexMap::new();
    let props_str = props_str.trim();

    if props_str.is_empty() {
        return props;
    }

    // Match: name="value" or name='value' or name={expr} or name (boolean)
    static PROP_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"([a-zA-Z][a-zA-Z0-9_-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\}))?"#)
            .expect("Invalid prop regex")
    });

    for caps in PROP_RE.captures_iter(props_str) {
        let Some(name) = caps.get(1) else {
            continue;
        };

        let value = if let Some(m) = caps.get(2) {
            // Double-quoted string
            PropValue::String(unescape_html(m.as_str()))
        } else if let Some(m) = caps.get(3) {
            // Single-quoted string
            PropValue::String(unescape_html(m.as_str()))
        } else if let Some(m) = caps.get(4) {
            // Expression
            PropValue::Expression(m.as_str().trim().to_string())
        } else {
            // Boolean (just the prop name)
            PropValue::Boolean(true)
        };

        props.insert(name.as_str().to_string(), value);
    }

    props
}

/// Convert parsed inline JSX to a custom element tag.
///
/// `children` replaces the element's own children, so callers can pass
/// already-rendered markup.
pub fn to_custom_element(jsx: &InlineJsx, tag_name: &str, children: Option<&str>) -> String {
    let mut attrs = Vec::new();

    for (key, value) in &jsx.props {
        match value {
            PropValue::String(s) => {
                attrs.push(format!(r#"{}="{}""#, key, html_escape(s)));
            }
            PropValue::Boolean(true) => {
                attrs.push(key.clone());
            }
            PropValue::Boolean(false) => {}
            PropValue::Expression(_) => {
                // Expressions have no static value
            }
        }
    }

    let attrs_str = if attrs.is_empty() {
        String::new()
    } else {
        format!(" {}", attrs.join(" "))
    };

    format!(
        "<{tag_name}{attrs_str}>{}</{tag_name}>",
        children.unwrap_or_default()
    )
}

/// Custom element name for a component: `HighlightSection` -> `highlight-section`.
///
/// Single-word names get an `mdx-` prefix since custom elements need a hyphen.
pub fn custom_element_name(component: &str) -> String {
    let mut name = String::with_capacity(component.len() + 4);
    for (i, c) in component.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('-');
            }
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }

    if name.contains('-') {
        name
    } else {
        format!("mdx-{}", name)
    }
}

/// Escape HTML special characters including single quotes for XSS prevention.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_self_closing() {
        let jsx = parse_inline_jsx(r#"<StaticTweet id="1234" />"#).unwrap();

        assert_eq!(jsx.component, "StaticTweet");
        assert!(jsx.self_closing);
        assert_eq!(jsx.prop("id"), Some("1234"));
        assert!(jsx.children.is_none());
    }

    #[test]
    fn parses_urls_in_props() {
        let (jsx, len) = parse_element(r#"<Image src="/img/cat.png" alt="Cat"/> after"#).unwrap();

        assert_eq!(jsx.prop("src"), Some("/img/cat.png"));
        assert_eq!(len, r#"<Image src="/img/cat.png" alt="Cat"/>"#.len());
    }

    #[test]
    fn parses_with_children() {
        let jsx = parse_inline_jsx(r#"<Callout variant="danger">Watch out</Callout>"#).unwrap();

        assert_eq!(jsx.component, "Callout");
        assert!(!jsx.self_closing);
        assert_eq!(
            jsx.props.get("variant"),
            Some(&PropValue::String("danger".to_string()))
        );
        assert_eq!(jsx.children, Some("Watch out".to_string()));
    }

    #[test]
    fn handles_nested_same_name() {
        let source = "<Callout>outer <Callout>inner</Callout> <Callout /> done</Callout> tail";

        let (jsx, len) = parse_element(source).unwrap();

        assert_eq!(
            jsx.children.as_deref(),
            Some("outer <Callout>inner</Callout> <Callout /> done")
        );
        assert_eq!(&source[len..], " tail");
    }

    #[test]
    fn does_not_confuse_prefixed_names() {
        let source = "<Pill>a <Pills>b</Pills></Pill>";

        let (jsx, _) = parse_element(source).unwrap();

        assert_eq!(jsx.children.as_deref(), Some("a <Pills>b</Pills>"));
    }

    #[test]
    fn parses_boolean_props() {
        let jsx = parse_inline_jsx(r#"<Button disabled>Disabled</Button>"#).unwrap();

        assert_eq!(jsx.props.get("disabled"), Some(&PropValue::Boolean(true)));
        assert!(jsx.flag("disabled"));
    }

    #[test]
    fn parses_expression_props() {
        let jsx = parse_inline_jsx(r#"<VideoPlayer src={videoUrl} />"#).unwrap();

        assert!(matches!(
            jsx.props.get("src"),
            Some(PropValue::Expression(e)) if e == "videoUrl"
        ));
    }

    #[test]
    fn unescapes_attribute_entities() {
        let jsx = parse_inline_jsx(r#"<Pill title="Tom &amp; Jerry" />"#).unwrap();

        assert_eq!(jsx.prop("title"), Some("Tom & Jerry"));
    }

    #[test]
    fn rejects_unclosed_element() {
        assert!(parse_element("<Callout>never closed").is_none());
    }

    #[test]
    fn converts_to_custom_element() {
        let jsx = parse_inline_jsx(r#"<Chart kind="bar" stacked>Sales</Chart>"#).unwrap();
        let html = to_custom_element(&jsx, "mdx-chart", jsx.children.as_deref());

        assert_eq!(html, r#"<mdx-chart kind="bar" stacked>Sales</mdx-chart>"#);
    }

    #[test]
    fn names_custom_elements() {
        assert_eq!(custom_element_name("HighlightSection"), "highlight-section");
        assert_eq!(custom_element_name("Chart"), "mdx-chart");
    }
}
