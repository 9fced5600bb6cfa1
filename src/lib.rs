//! spacetraveling: a static blog front-end for posts stored in Prismic
//!
//! Posts are fetched from a Prismic repository and rendered with embedded
//! Tera templates. The listing and the most recent posts are generated
//! ahead of time; the server renders the rest on first request and
//! supports preview and "load more".

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod pipeline;
pub mod prismic;
pub mod richtext;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// A blog site rooted in a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Site {
    /// Load the site in `base_dir`; `_config.yml` is optional
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::from_config(base_dir, config))
    }

    /// A site with an already loaded configuration
    pub fn from_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// A CMS client for the configured repository
    pub fn client(&self) -> Result<prismic::Client> {
        Ok(prismic::Client::new(&self.config.prismic)?)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
