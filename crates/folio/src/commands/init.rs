//! Create a new blog.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_mdx::SupportFiles;

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    let written = scaffold(Path::new("."), config_path, yes)?;
    for path in &written {
        tracing::info!("Created {}", path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'folio dev' to start the development server.");

    Ok(())
}

/// Write the starter files below `root`, returning the ones written.
///
/// Existing files are left alone unless `overwrite` is set.
fn scaffold(root: &Path, config_path: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let support = SupportFiles::default();

    let files = [
        (root.join(config_path), DEFAULT_CONFIG),
        (root.join("content/hello-world.mdx"), DEFAULT_POST),
        (root.join("snippets/copy-a-file.mdx"), DEFAULT_SNIPPET),
        (root.join(&support.scroll_spy), DEFAULT_SCROLL_SPY),
        (root.join(&support.theme_context), DEFAULT_THEME_CONTEXT),
    ];

    let mut written = Vec::new();
    for (path, contents) in files {
        if path.exists() && !overwrite {
            tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

const DEFAULT_CONFIG: &str = r##"# Folio Configuration

[site]
title = "My Blog"
base_url = "/"
# author = "Your Name"

[content]
# Blog root holding content/ and snippets/ (FOLIO_ROOT overrides this)
root = "."
scroll_spy = "core/components/MDX/custom/Widgets/ScrollSpyWidget.tsx"
theme_context = "core/context/ThemeContext.tsx"
# templates = "templates"

[build]
output = "dist"
minify = true

[tweets]
# JSON array of tweets for <StaticTweet id="..." /> embeds
# archive = "tweets.json"

[og]
background = "#1a1a1a"
color = "#ffffff"
"##;

const DEFAULT_POST: &str = r#"---
title: Hello, world
date: "2026-01-01"
description: The first post on this blog.
---

import ScrollSpyWidget from "./ScrollSpyWidget"

<ScrollSpyWidget />

## Writing posts

Posts are MDX files in `content/`. The file name is the slug, so this post
lives at `/posts/hello-world/`.

<Callout variant="info">

Components such as `<Callout>` work anywhere in a post.

</Callout>

## Images

![A placeholder](/images/placeholder.png "Images on their own line become figures")
"#;

const DEFAULT_SNIPPET: &str = r#"---
title: Copy a file
date: "2026-01-01"
---

```rust
std::fs::copy("from.txt", "to.txt")?;
```
"#;

const DEFAULT_SCROLL_SPY: &str = r#"type Heading = { id: string; title: string; level: number };

export default function ScrollSpyWidget({ toc = [] }: { toc?: Heading[] }) {
  return (
    <nav className="scroll-spy">
      <ul>
        {toc.map((heading) => (
          <li key={heading.id} className={`toc-level-${heading.level}`}>
            <a href={`#${heading.id}`}>{heading.title}</a>
          </li>
        ))}
      </ul>
    </nav>
  );
}
"#;

const DEFAULT_THEME_CONTEXT: &str = r#"import { createContext } from "react";

export type Theme = "light" | "dark";

export const ThemeContext = createContext<{ theme: Theme }>({ theme: "light" });
"#;
