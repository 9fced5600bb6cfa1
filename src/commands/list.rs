//! List the posts of the repository

use anyhow::Result;

use crate::content::PostSummary;
use crate::helpers;
use crate::pipeline;
use crate::Site;

/// Print every published post, following the listing to its last page
pub async fn run(site: &Site) -> Result<()> {
    let client = site.client()?;
    let listing = pipeline::fetch_all(&client, &site.config.prismic).await?;

    println!("Posts ({}):", listing.results.len());
    for post in &listing.results {
        println!("  {}", format_line(post));
    }

    Ok(())
}

fn format_line(post: &PostSummary) -> String {
    let date = post
        .first_publication_date
        .as_deref()
        .and_then(|d| helpers::format_date(d).ok())
        .unwrap_or_else(|| "-".to_string());
    format!("{:<11}  {}  {}", date, post.uid, post.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let post = PostSummary {
            uid: "hello".to_string(),
            first_publication_date: Some("2021-03-25T19:25:28+0000".to_string()),
            title: "Hello".to_string(),
            subtitle: String::new(),
            author: "Ada".to_string(),
        };
        assert_eq!(format_line(&post), "25 Mar 2021  hello  Hello");

        let undated = PostSummary {
            first_publication_date: None,
            ..post
        };
        assert_eq!(format_line(&undated), "-            hello  Hello");
    }
}
