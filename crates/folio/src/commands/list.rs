//! List content, newest first.

use anyhow::{Context, Result};
use folio_mdx::{ContentType, Summary};

use crate::config::Config;

/// Run the list command.
pub fn run(config: &Config, snippets: bool) -> Result<()> {
    let content_type = if snippets {
        ContentType::Snippet
    } else {
        ContentType::Post
    };

    let summaries = config
        .loader()
        .all_front_matter(content_type)
        .with_context(|| format!("Failed to list {}s", content_type))?;

    for summary in &summaries {
        println!("{}", format_summary(summary));
    }

    tracing::debug!("Listed {} {}s", summaries.len(), content_type);

    Ok(())
}

/// One listing line: date, slug and title.
fn format_summary(summary: &Summary) -> String {
    let date = summary.front_matter.date().unwrap_or_else(|| "-".to_string());
    let title = summary.front_matter.title().unwrap_or_default();

    format!("{:<12} {:<32} {}", date, summary.slug, title)
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_mdx::FrontMatter;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_dated_summary() {
        let mut front_matter = FrontMatter::new();
        front_matter.insert("title", "Hello");
        front_matter.insert("date", "2020-01-01");

        let line = format_summary(&Summary {
            slug: "hello".to_string(),
            front_matter,
        });

        assert_eq!(line, format!("2020-01-01   {:<32} Hello", "hello"));
    }

    #[test]
    fn formats_undated_summary() {
        let line = format_summary(&Summary {
            slug: "draft".to_string(),
            front_matter: FrontMatter::new(),
        });

        assert_eq!(line, format!("{:<12} draft", "-"));
    }
}
