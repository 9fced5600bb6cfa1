//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Site;

/// Generate the listing and the pre-rendered posts
pub async fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let client = site.client()?;
    let generator = Generator::new(site)?;
    let report = generator.generate(&client).await?;

    tracing::info!(
        "Listed {} posts, pre-rendered {} posts",
        report.listed,
        report.prebuilt.len()
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
