//! Frontmatter extraction and parsing.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Parsed frontmatter from an MDX file.
///
/// Keys are kept verbatim and in the order they were written, so a block can be
/// written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrontMatter {
    fields: IndexMap<String, Value>,
}

impl FrontMatter {
    /// Create an empty frontmatter mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a value as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Post title.
    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// Background color used for the featured card and OG image.
    pub fn color_featured(&self) -> Option<&str> {
        self.get_str("colorFeatured")
    }

    /// Text color used for the featured card and OG image.
    pub fn font_featured(&self) -> Option<&str> {
        self.get_str("fontFeatured")
    }

    /// The `date` field as text.
    ///
    /// YAML numbers are rendered in their textual form. Anything else has no
    /// date.
    pub fn date(&self) -> Option<String> {
        match self.fields.get("date")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Layer these fields over `defaults`.
    ///
    /// Default keys come first; any key also present here keeps its position
    /// from `defaults` but takes this mapping's value.
    pub fn over<I>(self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut fields: IndexMap<String, Value> = defaults.into_iter().collect();
        for (key, value) in self.fields {
            fields.insert(key, value);
        }
        Self { fields }
    }

    /// Serialize to a `---` delimited block followed by a newline.
    pub fn to_block(&self) -> Result<String, FrontmatterError> {
        if self.fields.is_empty() {
            return Ok("---\n---\n".to_string());
        }

        let yaml = serde_yaml::to_string(&self.fields)
            .map_err(|e| FrontmatterError::Serialize(e.to_string()))?;

        Ok(format!("---\n{}---\n", yaml))
    }
}

impl FromIterator<(String, Value)> for FrontMatter {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Order two frontmatter mappings newest first.
///
/// Two numeric dates compare by value; otherwise dates compare as text, so ISO
/// dates sort chronologically. Entries without a date sort after every dated
/// entry.
pub fn newest_first(a: &FrontMatter, b: &FrontMatter) -> Ordering {
    match (b.get("date"), a.get("date")) {
        (Some(Value::Number(later)), Some(Value::Number(earlier))) => {
            match (later.as_f64(), earlier.as_f64()) {
                (Some(later), Some(earlier)) => later.total_cmp(&earlier),
                _ => b.date().cmp(&a.date()),
            }
        }
        _ => b.date().cmp(&a.date()),
    }
}

/// Extract frontmatter from MDX content.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
/// A document without a block yields an empty mapping and the whole source.
pub fn extract_frontmatter(source: &str) -> Result<(FrontMatter, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((FrontMatter::new(), source));
    }

    // Find the closing ---
    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let rest = &after_open[close_pos + 4..];
    // Drop whatever trails the closing delimiter on its own line
    let remaining = match rest.find('\n') {
        Some(eol) => &rest[eol + 1..],
        None => "",
    };

    Ok((parse_yaml(yaml_content)?, remaining.trim_start()))
}

fn parse_yaml(yaml: &str) -> Result<FrontMatter, FrontmatterError> {
    if yaml.is_empty() {
        return Ok(FrontMatter::new());
    }

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    match value {
        Value::Null => Ok(FrontMatter::new()),
        Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))
        }
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,

    #[error("Failed to serialize frontmatter: {0}")]
    Serialize(String),
}
