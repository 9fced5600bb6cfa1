//! Data shapes of the `posts` custom type

use serde::{Deserialize, Deserializer, Serialize};

use crate::richtext::{RichText, TextField};

/// Custom type id of blog posts
pub const POST_TYPE: &str = "posts";

/// Fields requested for listing entries
pub const SUMMARY_FIELDS: [&str; 3] = ["posts.title", "posts.subtitle", "posts.author"];

/// Listing entries: only the fields fetched for the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: TextField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: TextField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: TextField,
}

/// A full post document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: TextField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: TextField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: TextField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub banner: ImageField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentSection>,
}

/// An image field; an empty image is `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageField {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// One entry of the `content` group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: TextField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: RichText,
}

/// Empty fields come back as `null`; read them as the empty value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
