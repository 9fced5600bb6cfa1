//! Generator module - renders pages with the built-in Tera templates and
//! writes them to the public directory

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::{PostDetail, PostPagination, PostSummary};
use crate::pipeline;
use crate::prismic::Client;
use crate::templates::{Pages, TemplateRenderer};
use crate::Site;

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
}

/// What a generation run wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub listed: usize,
    pub prebuilt: Vec<String>,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the listing, the pre-rendered posts and the 404 page
    ///
    /// Any CMS or render error fails the whole run.
    pub async fn generate(&self, client: &Client) -> Result<GenerateReport> {
        let config = &self.site.config;
        fs::create_dir_all(&self.site.public_dir)?;

        // Pages rendered on demand by an earlier server run may be stale
        let post_dir = self.site.public_dir.join("post");
        if post_dir.exists() {
            fs::remove_dir_all(&post_dir)?;
        }

        let listing = pipeline::fetch_initial(client, &config.prismic, None).await?;
        let html = self.render_listing(&listing, false)?;
        self.write_page(self.site.public_dir.join("index.html"), &html)?;

        let uids = pipeline::static_paths(client, &config.prismic).await?;
        for uid in &uids {
            let post =
                pipeline::fetch_post(client, uid, None, config.reading.words_per_minute).await?;
            self.write_post(&post)?;
        }

        let html = self.render_not_found()?;
        self.write_page(self.site.public_dir.join("404.html"), &html)?;

        Ok(GenerateReport {
            listed: listing.results.len(),
            prebuilt: uids,
        })
    }

    fn pages(&self) -> Pages<'_> {
        Pages::new(&self.site.config)
    }

    pub fn render_listing(&self, listing: &PostPagination, preview: bool) -> Result<String> {
        let context = self
            .pages()
            .listing(&listing.results, listing.next_page.as_deref(), preview);
        self.renderer.render("index.html", &context)
    }

    /// The `<li>` entries appended to the list by "load more"
    pub fn render_post_items(&self, posts: &[PostSummary]) -> Result<String> {
        self.renderer
            .render("partials/post_items.html", &self.pages().post_items(posts))
    }

    pub fn render_post(&self, post: &PostDetail, preview: bool) -> Result<String> {
        self.renderer
            .render("post.html", &self.pages().post(post, preview))
    }

    pub fn render_loading(&self, refresh_secs: u64) -> Result<String> {
        self.renderer
            .render("loading.html", &self.pages().loading(refresh_secs))
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer
            .render("not_found.html", &self.pages().not_found())
    }

    pub fn render_error(&self, retry_path: &str) -> Result<String> {
        self.renderer
            .render("error.html", &self.pages().error(retry_path))
    }

    /// Where the page of `uid` lives in the public directory
    pub fn post_output_path(&self, uid: &str) -> PathBuf {
        self.site
            .public_dir
            .join("post")
            .join(uid)
            .join("index.html")
    }

    /// Render a post and write it where the static server finds it
    pub fn write_post(&self, post: &PostDetail) -> Result<PathBuf> {
        if !pipeline::is_valid_uid(&post.uid) {
            anyhow::bail!("Refusing to write post with uid {:?}", post.uid);
        }
        let html = self.render_post(post, false)?;
        let output_path = self.post_output_path(&post.uid);
        self.write_page(output_path.clone(), &html)?;
        Ok(output_path)
    }

    fn write_page(&self, output_path: PathBuf, html: &str) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::prismic::fake::{self, FakeCms};

    fn site(cms: &FakeCms, dir: &std::path::Path, prebuild_count: usize) -> Site {
        let mut config = SiteConfig::default();
        config.prismic = cms.config();
        config.prismic.prebuild_count = prebuild_count;
        config.prismic.page_size = 2;
        Site::from_config(dir, config)
    }

    #[tokio::test]
    async fn test_generate_writes_listing_and_prebuilt_posts() {
        let cms = FakeCms::start(fake::posts(3)).await;
        let dir = tempfile::tempdir().unwrap();
        let site = site(&cms, dir.path(), 2);

        let generator = Generator::new(&site).unwrap();
        let report = generator.generate(&cms.client()).await.unwrap();

        assert_eq!(report.listed, 2);
        assert_eq!(report.prebuilt, vec!["post-1", "post-2"]);

        let index = fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert!(index.contains("Post 1"));
        assert!(index.contains("Post 2"));
        assert!(!index.contains("Post 3"));
        assert!(index.contains("Carregar mais posts"));

        let post = fs::read_to_string(generator.post_output_path("post-1")).unwrap();
        assert!(post.contains("Subtitle of Post 1"));
        assert!(post.contains("1 min"));
        assert!(!generator.post_output_path("post-3").exists());
        assert!(site.public_dir.join("404.html").exists());
    }

    #[tokio::test]
    async fn test_generate_removes_stale_posts() {
        let cms = FakeCms::start(fake::posts(1)).await;
        let dir = tempfile::tempdir().unwrap();
        let site = site(&cms, dir.path(), 0);
        let generator = Generator::new(&site).unwrap();

        let stale = generator.post_output_path("old");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let report = generator.generate(&cms.client()).await.unwrap();
        assert!(report.prebuilt.is_empty());
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_generate_fails_on_cms_error() {
        let cms = FakeCms::start(fake::posts(1)).await;
        cms.set_failing(true);
        let dir = tempfile::tempdir().unwrap();
        let site = site(&cms, dir.path(), 1);

        let generator = Generator::new(&site).unwrap();
        assert!(generator.generate(&cms.client()).await.is_err());
    }

    #[test]
    fn test_write_post_rejects_unsafe_uid() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::from_config(dir.path(), SiteConfig::default());
        let generator = Generator::new(&site).unwrap();
        let post = PostDetail {
            uid: "../escape".to_string(),
            first_publication_date: None,
            title: "T".to_string(),
            subtitle: String::new(),
            author: String::new(),
            banner_url: None,
            sections: Vec::new(),
            reading_time_minutes: 0,
        };
        assert!(generator.write_post(&post).is_err());
    }
}
