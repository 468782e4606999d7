//! Markdown to HTML conversion for single-document views.

use std::collections::HashMap;
use std::path::Path;

use pulldown_cmark::{Options, Parser, html};
use serde_json::Value;

/// What a renderer knows about the document being rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub path: &'a Path,
    pub meta: &'a HashMap<String, Value>,
}

/// Converts a markdown body into HTML.
///
/// An empty result makes the caller fall back to the raw body.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, body: &str, ctx: &RenderContext<'_>) -> String;
}

/// Default renderer backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy)]
pub struct PulldownRenderer {
    gfm: bool,
}

impl Default for PulldownRenderer {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl PulldownRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    fn parser_options(self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl MarkdownRenderer for PulldownRenderer {
    fn render(&self, body: &str, _ctx: &RenderContext<'_>) -> String {
        let mut out = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(body, self.parser_options()));
        out
    }
}
