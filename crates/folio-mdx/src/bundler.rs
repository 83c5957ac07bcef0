//! MDX bundler.
//!
//! Compiles an MDX document together with the support modules it may import
//! into a [`Bundle`]: the rendered document markup (component tags preserved for
//! hydration), the compiled modules, and the document outline.
//!
//! Bundling is all or nothing. Malformed frontmatter, a module that does not
//! parse, an import that does not resolve, unbalanced component tags or a
//! failing plugin abort the whole bundle.

use std::sync::LazyLock;

use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_parser::Parser as ModuleParser;
use oxc_span::SourceType;
use pulldown_cmark::{html, Event, Options, Parser, Tag};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::frontmatter::{extract_frontmatter, FrontMatter, FrontmatterError};
use crate::plugins::{default_plugins, escape_html, heading_text, PluginError, RemarkPlugin};

/// Extensions tried when an import omits one.
const MODULE_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js"];

/// A compiled MDX document.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    /// Rendered document markup. Component tags are left in place for hydration.
    pub code: String,

    /// Support modules compiled alongside the document
    pub modules: Vec<CompiledModule>,

    /// Document outline
    pub toc: Vec<TocEntry>,
}

/// A support module that compiled cleanly.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledModule {
    /// Logical name the document imports it by (e.g. `./ThemeContext.tsx`)
    pub name: String,

    /// Module source
    pub source: String,

    /// Whether the module has a default export
    pub default_export: bool,

    /// Number of named export statements
    pub named_exports: usize,
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Result of bundling one document.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    pub bundle: Bundle,
    pub front_matter: FrontMatter,
}

/// Errors that can occur when bundling MDX.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Failed to compile {name}: {message}")]
    Module { name: String, message: String },

    #[error("Could not resolve import \"{specifier}\" at line {line}")]
    UnresolvedImport { specifier: String, line: usize },

    #[error("{name} has no {kind} export (imported at line {line})")]
    MissingExport {
        name: String,
        kind: &'static str,
        line: usize,
    },

    #[error("Unclosed <{name}> opened at line {line}")]
    UnclosedTag { name: String, line: usize },

    #[error("Expected </{expected}> but found </{found}> at line {line}")]
    MismatchedTag {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("Unexpected </{name}> at line {line}")]
    UnexpectedClose { name: String, line: usize },

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Compiles MDX documents with a fixed plugin pipeline.
pub struct MdxBundler {
    plugins: Vec<Box<dyn RemarkPlugin>>,
}

impl MdxBundler {
    /// Create a bundler with the default plugins.
    pub fn new() -> Self {
        Self::with_plugins(default_plugins())
    }

    /// Create a bundler with a custom plugin pipeline.
    pub fn with_plugins(plugins: Vec<Box<dyn RemarkPlugin>>) -> Self {
        Self { plugins }
    }

    /// Names of the configured plugins, in order.
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Bundle `source`, making `files` available to its imports by name.
    pub fn bundle(
        &self,
        source: &str,
        files: &IndexMap<String, String>,
    ) -> Result<BundleOutput, BundleError> {
        let (front_matter, body) = extract_frontmatter(source)?;
        let line_offset = source[..source.len() - body.len()].lines().count();

        let modules = files
            .iter()
            .map(|(name, text)| compile_module(name, text))
            .collect::<Result<Vec<_>, _>>()?;

        let prepared = strip_esm(body, line_offset);
        resolve_imports(&prepared.imports, &modules)?;
        let markdown = check_components(&prepared.masked, &prepared.markdown, line_offset)?;

        let (code, toc) = self.compile(&markdown)?;

        tracing::debug!(
            "Bundled document: {} bytes, {} headings, {} modules",
            code.len(),
            toc.len(),
            modules.len()
        );

        Ok(BundleOutput {
            bundle: Bundle { code, modules, toc },
            front_matter,
        })
    }

    /// Run the markdown through the plugins and render it.
    fn compile(&self, markdown: &str) -> Result<(String, Vec<TocEntry>), BundleError> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;

        let mut events: Vec<Event> = Parser::new_ext(markdown, options).collect();
        for plugin in &self.plugins {
            events = plugin.transform(events)?;
        }

        let toc = build_toc(&events);

        let mut code = String::new();
        html::push_html(&mut code, events.into_iter());

        Ok((code, toc))
    }
}

impl Default for MdxBundler {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a support module and record what it exports.
fn compile_module(name: &str, source: &str) -> Result<CompiledModule, BundleError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(name).unwrap_or_else(|_| SourceType::tsx());
    let ret = ModuleParser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(BundleError::Module {
            name: name.to_string(),
            message: if message.is_empty() {
                "parser aborted".to_string()
            } else {
                message
            },
        });
    }

    let mut default_export = false;
    let mut named_exports = 0;
    for stmt in ret.program.body.iter() {
        match stmt {
            Statement::ExportDefaultDeclaration(_) => default_export = true,
            Statement::ExportNamedDeclaration(_) | Statement::ExportAllDeclaration(_) => {
                named_exports += 1
            }
            _ => {}
        }
    }

    Ok(CompiledModule {
        name: name.to_string(),
        source: source.to_string(),
        default_export,
        named_exports,
    })
}

/// An `import` statement found in the document.
#[derive(Debug, Clone, PartialEq)]
struct Import {
    specifier: String,
    default: bool,
    named: bool,
    line: usize,
}

/// Document body split for compilation.
///
/// `markdown` has ESM blanked out; `masked` additionally blanks code, so tags
/// inside code are never treated as components. Both keep the byte offsets of
/// the original body.
struct Prepared {
    markdown: String,
    masked: String,
    imports: Vec<Import>,
}

/// Remove top-level `import`/`export` blocks from the body.
///
/// An ESM block starts with a line beginning with `import ` or `export ` and
/// runs to the next blank line.
fn strip_esm(body: &str, line_offset: usize) -> Prepared {
    let mut markdown = String::with_capacity(body.len());
    let mut masked = String::with_capacity(body.len());
    let mut imports = Vec::new();

    let mut fence: Option<&str> = None;
    let mut esm: Option<(usize, String)> = None;

    for (idx, line) in body.split_inclusive('\n').enumerate() {
        let line_number = line_offset + idx + 1;
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            markdown.push_str(line);
            masked.push_str(&blank(line));
            continue;
        }

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fence = Some(&trimmed[..3]);
            markdown.push_str(line);
            masked.push_str(&blank(line));
            continue;
        }

        if line.trim().is_empty() {
            if let Some((start, block)) = esm.take() {
                imports.extend(parse_imports(&block, start));
            }
        } else if esm.is_none() && (line.starts_with("import ") || line.starts_with("export ")) {
            esm = Some((line_number, String::new()));
        }

        if let Some((_, block)) = esm.as_mut() {
            block.push_str(line);
            let blanked = blank(line);
            markdown.push_str(&blanked);
            masked.push_str(&blanked);
            continue;
        }

        markdown.push_str(line);
        masked.push_str(&mask_inline_code(line));
    }

    if let Some((start, block)) = esm.take() {
        imports.extend(parse_imports(&block, start));
    }

    Prepared {
        markdown,
        masked,
        imports,
    }
}

fn parse_imports(block: &str, first_line: usize) -> Vec<Import> {
    static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?m)^import\s+(?:([\s\S]*?)\s+from\s+)?['"]([^'"]+)['"]"#)
            .expect("Invalid import regex")
    });

    IMPORT_RE
        .captures_iter(block)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let clause = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let specifier = caps.get(2)?.as_str().to_string();

            Some(Import {
                specifier,
                default: clause
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$'),
                named: clause.contains('{'),
                line: first_line + block[..whole.start()].matches('\n').count(),
            })
        })
        .collect()
}

fn resolve_imports(imports: &[Import], modules: &[CompiledModule]) -> Result<(), BundleError> {
    for import in imports {
        let Some(module) = modules
            .iter()
            .find(|m| resolves(&import.specifier, &m.name))
        else {
            return Err(BundleError::UnresolvedImport {
                specifier: import.specifier.clone(),
                line: import.line,
            });
        };

        if import.default && !module.default_export {
            return Err(BundleError::MissingExport {
                name: module.name.clone(),
                kind: "default",
                line: import.line,
            });
        }

        if import.named && module.named_exports == 0 {
            return Err(BundleError::MissingExport {
                name: module.name.clone(),
                kind: "named",
                line: import.line,
            });
        }
    }

    Ok(())
}

/// Whether an import specifier refers to the module registered as `name`.
fn resolves(specifier: &str, name: &str) -> bool {
    specifier == name
        || MODULE_EXTENSIONS
            .iter()
            .any(|ext| name.strip_suffix(ext) == Some(specifier))
}

/// Matches a component tag: capitalised name, attributes (braced expressions may
/// contain `>`), optional self-closing slash.
pub(crate) static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Z][A-Za-z0-9]*)((?:[^<>{}]|\{[^{}]*\})*?)(/?)>")
        .expect("Invalid component tag regex")
});

/// Check component tags balance and rewrite braced attributes as plain ones.
///
/// Returns the markdown ready for compilation.
fn check_components(
    masked: &str,
    markdown: &str,
    line_offset: usize,
) -> Result<String, BundleError> {
    let mut stack: Vec<(String, usize)> = Vec::new();
    let mut out = String::with_capacity(markdown.len());
    let mut last = 0;

    for caps in TAG_RE.captures_iter(masked) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let line = line_offset + masked[..whole.start()].matches('\n').count() + 1;
        let name = &caps[2];
        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty();

        if closing {
            match stack.pop() {
                Some((open, _)) if open == name => {}
                Some((open, _)) => {
                    return Err(BundleError::MismatchedTag {
                        expected: open,
                        found: name.to_string(),
                        line,
                    })
                }
                None => {
                    return Err(BundleError::UnexpectedClose {
                        name: name.to_string(),
                        line,
                    })
                }
            }
        } else if !self_closing {
            stack.push((name.to_string(), line));
        }

        let attrs = &caps[3];
        if attrs.contains('{') {
            out.push_str(&markdown[last..whole.start()]);
            out.push_str(&normalize_tag(name, attrs, self_closing));
            last = whole.end();
        }
    }

    if let Some((name, line)) = stack.pop() {
        return Err(BundleError::UnclosedTag { name, line });
    }

    out.push_str(&markdown[last..]);
    Ok(out)
}

/// Rewrite `name={expr}` attributes as `name="expr"`.
fn normalize_tag(name: &str, attrs: &str, self_closing: bool) -> String {
    static EXPR_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"([A-Za-z][A-Za-z0-9_-]*)\s*=\s*\{([^{}]*)\}")
            .expect("Invalid expression attribute regex")
    });

    let attrs = EXPR_ATTR_RE.replace_all(attrs, |caps: &Captures| {
        format!(r#"{}="{}""#, &caps[1], escape_html(unquote(caps[2].trim())))
    });
    let attrs = attrs.trim_end();

    format!("<{}{}{}>", name, attrs, if self_closing { " /" } else { "" })
}

fn unquote(expr: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = expr
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    expr
}

fn build_toc(events: &[Event<'_>]) -> Vec<TocEntry> {
    events
        .iter()
        .enumerate()
        .filter_map(|(idx, event)| match event {
            Event::Start(Tag::Heading {
                level, id: Some(id), ..
            }) => Some(TocEntry {
                title: heading_text(&events[idx + 1..]),
                id: id.to_string(),
                level: *level as u8,
            }),
            _ => None,
        })
        .collect()
}

/// Replace everything but newlines with spaces, keeping byte length.
fn blank(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    }
    out
}

fn mask_inline_code(line: &str) -> String {
    static CODE_SPAN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"`[^`\n]*`").expect("Invalid code span regex"));

    CODE_SPAN_RE
        .replace_all(line, |caps: &Captures| blank(&caps[0]))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCROLL_SPY: &str = r#"import React from 'react';

export default function ScrollSpyWidget() {
  return <nav className="scroll-spy" />;
}
"#;

    const THEME_CONTEXT: &str = r#"import React from 'react';

export const ThemeContext = React.createContext({ dark: false });
"#;

    fn support_files() -> IndexMap<String, String> {
        let mut files = IndexMap::new();
        files.insert("./ScrollSpyWidget.tsx".to_string(), SCROLL_SPY.to_string());
        files.insert("./ThemeContext.tsx".to_string(), THEME_CONTEXT.to_string());
        files
    }

    fn bundle(source: &str) -> Result<BundleOutput, BundleError> {
        MdxBundler::new().bundle(source, &support_files())
    }

    #[test]
    fn bundles_complete_document() {
        let source = r#"---
title: Hello
date: '2021-01-01'
---

import ScrollSpyWidget from './ScrollSpyWidget.tsx'

# Hello

Some **bold** text.

<Callout variant="info">

Inside a callout.

</Callout>

## Details

<StaticTweet id="123" />
"#;

        let out = bundle(source).unwrap();

        assert_eq!(out.front_matter.title(), Some("Hello"));
        assert!(!out.bundle.code.contains("import ScrollSpyWidget"));
        assert!(out.bundle.code.contains(r#"<h1 id="hello">"#));
        assert!(out.bundle.code.contains("<strong>bold</strong>"));
        assert!(out.bundle.code.contains(r#"<Callout variant="info">"#));
        assert!(out.bundle.code.contains(r#"<StaticTweet id="123" />"#));
        assert!(out.bundle.code.contains("<section>"));
        assert_eq!(
            out.bundle.toc,
            vec![
                TocEntry {
                    title: "Hello".to_string(),
                    id: "hello".to_string(),
                    level: 1
                },
                TocEntry {
                    title: "Details".to_string(),
                    id: "details".to_string(),
                    level: 2
                },
            ]
        );
    }

    #[test]
    fn compiles_support_modules() {
        let out = bundle("# Hi").unwrap();

        assert_eq!(out.bundle.modules.len(), 2);
        assert!(out.bundle.modules[0].default_export);
        assert_eq!(out.bundle.modules[1].named_exports, 1);
        assert!(!out.bundle.modules[1].default_export);
    }

    #[test]
    fn fails_on_broken_module() {
        let mut files = support_files();
        files.insert("./Broken.tsx".to_string(), "export const = ;".to_string());

        let result = MdxBundler::new().bundle("# Hi", &files);

        assert!(matches!(result, Err(BundleError::Module { name, .. }) if name == "./Broken.tsx"));
    }

    #[test]
    fn resolves_imports_without_extension() {
        let source = "import { ThemeContext } from './ThemeContext'\n\n# Themed";

        assert!(bundle(source).is_ok());
    }

    #[test]
    fn fails_on_unresolved_import() {
        let source = "---\ntitle: T\n---\n\nimport Chart from './Chart.tsx'\n\nText";

        let err = bundle(source).unwrap_err();

        match err {
            BundleError::UnresolvedImport { specifier, line } => {
                assert_eq!(specifier, "./Chart.tsx");
                assert_eq!(line, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fails_on_missing_default_export() {
        let source = "import Theme from './ThemeContext.tsx'\n\nText";

        assert!(matches!(
            bundle(source),
            Err(BundleError::MissingExport { kind: "default", .. })
        ));
    }

    #[test]
    fn fails_on_unclosed_component() {
        let source = "# Title\n\n<Callout>\n\nNever closed.";

        let err = bundle(source).unwrap_err();

        assert!(matches!(err, BundleError::UnclosedTag { ref name, line: 3 } if name == "Callout"));
    }

    #[test]
    fn fails_on_mismatched_component() {
        let source = "<Callout>\n\ntext\n\n</Pill>";

        assert!(matches!(
            bundle(source),
            Err(BundleError::MismatchedTag { .. })
        ));
    }

    #[test]
    fn ignores_tags_in_code() {
        let source = "Use `<Callout>` like this:\n\n```mdx\n<Callout>\n```\n";

        assert!(bundle(source).is_ok());
    }

    #[test]
    fn normalizes_expression_attributes() {
        let source = r#"<Image src={"/a.png"} width={600} alt="A" />"#;

        let out = bundle(source).unwrap();

        assert!(out
            .bundle
            .code
            .contains(r#"<Image src="/a.png" width="600" alt="A" />"#));
    }

    #[test]
    fn fails_on_frontmatter_error() {
        assert!(matches!(
            bundle("---\ntitle: T\n"),
            Err(BundleError::Frontmatter(_))
        ));
    }

    #[test]
    fn component_headings_stay_inside_component() {
        let out = bundle("<Callout>\n\n## Inside\n\ntext\n\n</Callout>\n\n## After\n\nmore\n").unwrap();

        let code = &out.bundle.code;
        let callout_end = code.find("</Callout>").unwrap();
        let section = code.find("<section>").unwrap();
        assert!(section > callout_end);
        assert_eq!(code.matches("<section>").count(), 1);
        assert_eq!(code.matches("</section>").count(), 1);
    }

    #[test]
    fn plugin_order() {
        assert_eq!(
            MdxBundler::new().plugin_names(),
            vec!["slug", "autolink-headings", "sectionize", "figure"]
        );
    }
}
