//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary; the listing, post, loading,
//! not-found and error pages all extend `layout.html`.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{CommentsConfig, SiteConfig};
use crate::content::{PostDetail, PostSummary};
use crate::helpers;

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/post_items.html",
                include_str!("site/partials/post_items.html"),
            ),
            (
                "partials/comments.html",
                include_str!("site/partials/comments.html"),
            ),
            (
                "partials/exit_preview.html",
                include_str!("site/partials/exit_preview.html"),
            ),
        ])?;

        // Register custom filters
        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("date_xml", date_xml_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format a CMS date as `dd Mon yyyy`
///
/// An unreadable date fails the render.
fn date_format_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    helpers::format_date(&s)
        .map(tera::Value::String)
        .map_err(|e| tera::Error::msg(e.to_string()))
}

/// Tera filter: ISO date for `datetime` attributes
fn date_xml_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_xml", "value", String, value);
    helpers::date_xml(&s)
        .map(tera::Value::String)
        .map_err(|e| tera::Error::msg(e.to_string()))
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub generator: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            generator: helpers::meta_generator(),
        }
    }
}

/// Builds the context of each page kind
pub struct Pages<'a> {
    site: SiteData,
    comments: &'a CommentsConfig,
}

impl<'a> Pages<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            site: SiteData::from_config(config),
            comments: &config.comments,
        }
    }

    fn base(&self, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("comments", self.comments);
        context.insert("preview", &preview);
        context
    }

    pub fn listing(&self, posts: &[PostSummary], next_page: Option<&str>, preview: bool) -> Context {
        let mut context = self.base(preview);
        context.insert("posts", posts);
        context.insert("next_page", &next_page);
        context
    }

    /// Context of the `<li>` fragment appended by "load more"
    pub fn post_items(&self, posts: &[PostSummary]) -> Context {
        let mut context = Context::new();
        context.insert("posts", posts);
        context
    }

    pub fn post(&self, post: &PostDetail, preview: bool) -> Context {
        let mut context = self.base(preview);
        context.insert("post", post);
        context
    }

    pub fn loading(&self, refresh_secs: u64) -> Context {
        let mut context = self.base(false);
        context.insert("refresh_secs", &refresh_secs);
        context
    }

    pub fn not_found(&self) -> Context {
        self.base(false)
    }

    pub fn error(&self, retry_path: &str) -> Context {
        let mut context = self.base(false);
        context.insert("retry_path", retry_path);
        context
    }
}
