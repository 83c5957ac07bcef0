//! Asset pipeline for CSS and JavaScript processing.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* folio blog theme */

:root {
  --background: #fdfdfc;
  --foreground: #1f2328;
  --muted: #6b7280;
  --accent: #2563eb;
  --border: #e5e7eb;
  --code-background: #f3f4f6;
  --content-max-width: 720px;
  --radius: 0.5rem;
}

:root[data-theme="dark"] {
  --background: #121212;
  --foreground: #e5e7eb;
  --muted: #9ca3af;
  --accent: #60a5fa;
  --border: #2d2d2d;
  --code-background: #1e1e1e;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.7;
}

a {
  color: var(--accent);
}

.site-header,
.site-footer,
.main {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 1.5rem;
}

.site-header {
  display: flex;
  justify-content: space-between;
  align-items: center;
}

.site-title {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.theme-toggle {
  background: none;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--foreground);
  cursor: pointer;
  padding: 0.25rem 0.5rem;
}

.site-footer {
  color: var(--muted);
  font-size: 0.875rem;
}

/* Listing */
.post-list {
  list-style: none;
  padding: 0;
}

.post-list li {
  margin-bottom: 1.25rem;
}

.post-list time,
.post-meta {
  color: var(--muted);
  font-size: 0.875rem;
}

.post-meta span + time,
.post-meta time + span {
  margin-left: 0.75rem;
}

/* Content */
.content h2,
.content h3,
.content h4 {
  scroll-margin-top: 1rem;
}

.content .anchor {
  margin-left: 0.5rem;
  opacity: 0;
  text-decoration: none;
}

.content h2:hover .anchor,
.content h3:hover .anchor {
  opacity: 1;
}

.content pre {
  position: relative;
  background: var(--code-background);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
}

.content code {
  font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
  font-size: 0.9em;
}

.content figure {
  margin: 2rem 0;
  text-align: center;
}

.content figure img,
.content video {
  max-width: 100%;
  height: auto;
  border-radius: var(--radius);
}

.content figcaption {
  color: var(--muted);
  font-size: 0.875rem;
}

.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  font-size: 0.75rem;
  cursor: pointer;
}

/* Components */
.callout {
  border-left: 4px solid var(--accent);
  background: var(--code-background);
  border-radius: var(--radius);
  padding: 0.75rem 1rem;
  margin: 1.5rem 0;
}

.callout-danger {
  border-color: #dc2626;
}

.callout-warning {
  border-color: #d97706;
}

.callout-success {
  border-color: #16a34a;
}

.pill {
  display: inline-block;
  border-radius: 999px;
  padding: 0 0.6rem;
  font-size: 0.8rem;
  background: var(--code-background);
  border: 1px solid var(--border);
}

.button {
  display: inline-block;
  padding: 0.5rem 1rem;
  border-radius: var(--radius);
  border: none;
  background: var(--accent);
  color: #fff;
  text-decoration: none;
  cursor: pointer;
}

.button[disabled] {
  opacity: 0.5;
  cursor: not-allowed;
}

.highlight-section {
  background: var(--code-background);
  border-radius: var(--radius);
  padding: 1rem 1.5rem;
  margin: 2rem 0;
}

.tweet {
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  margin: 1.5rem 0;
}

.tweet-author {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  font-weight: 600;
}

.tweet-avatar {
  border-radius: 50%;
}

.tweet-username,
.tweet-meta {
  color: var(--muted);
  font-size: 0.875rem;
  font-weight: 400;
}

.tweet-meta span {
  margin-left: 0.75rem;
}

.scroll-spy ul {
  list-style: none;
  padding-left: 0;
  font-size: 0.875rem;
}

.scroll-spy .toc-level-3 {
  padding-left: 1rem;
}

.scroll-spy a.active {
  font-weight: 600;
}

.not-found {
  text-align: center;
  padding: 4rem 0;
}
"#;

const DEFAULT_JS: &str = r#"// folio blog runtime
(function() {
  'use strict';

  // Theme toggle, remembered across visits
  const root = document.documentElement;
  const stored = localStorage.getItem('folio-theme');
  if (stored) {
    root.dataset.theme = stored;
  }

  const toggle = document.querySelector('.theme-toggle');
  if (toggle) {
    toggle.addEventListener('click', () => {
      const next = root.dataset.theme === 'dark' ? 'light' : 'dark';
      root.dataset.theme = next;
      localStorage.setItem('folio-theme', next);
    });
  }

  // Highlight the outline entry for the section in view
  const spyLinks = document.querySelectorAll('.scroll-spy a');
  if (spyLinks.length > 0 && 'IntersectionObserver' in window) {
    const byId = new Map();
    spyLinks.forEach(link => byId.set(link.getAttribute('href').slice(1), link));

    const observer = new IntersectionObserver(entries => {
      entries.forEach(entry => {
        const link = byId.get(entry.target.id);
        if (link && entry.isIntersecting) {
          spyLinks.forEach(l => l.classList.remove('active'));
          link.classList.add('active');
        }
      });
    }, { rootMargin: '0px 0px -70% 0px' });

    byId.forEach((_, id) => {
      const heading = document.getElementById(id);
      if (heading) observer.observe(heading);
    });
  }

  // Copy code button for pre blocks
  document.querySelectorAll('.content pre').forEach(pre => {
    if (pre.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = pre.querySelector('code');
      const text = code ? code.textContent : pre.textContent;

      try {
        await navigator.clipboard.writeText(text || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    pre.appendChild(btn);
  });
})();
"#;
