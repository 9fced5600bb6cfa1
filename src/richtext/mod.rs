//! Prismic rich text model
//!
//! Rich text arrives from the content API as a JSON array of blocks, each
//! carrying its text and a list of inline spans addressed by offsets into
//! that text. This module decodes the structure and serializes it either as
//! HTML (see [`as_html`]) or as plain text for word counting.

mod html;

use serde::{Deserialize, Serialize};

pub use html::{as_html, resolve_link};

/// A rich text value: an ordered list of blocks
pub type RichText = Vec<Block>;

/// Block types known to the serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    #[serde(rename = "preformatted")]
    Preformatted,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "embed")]
    Embed,
    #[serde(other)]
    Unknown,
}

/// One block of rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Image source
    #[serde(default)]
    pub url: Option<String>,
    /// Image alternative text
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub oembed: Option<Embed>,
}

impl Block {
    /// A text block without spans
    pub fn plain(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }
}

/// Inline formatting types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

/// Inline formatting over `start..end`
///
/// Offsets count UTF-16 code units, as the editor reports JavaScript string
/// positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

/// Extra data of hyperlink and label spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    pub link_type: Option<String>,
    pub url: Option<String>,
    pub target: Option<String>,
    /// Document links: uid and custom type of the target
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub label: Option<String>,
}

/// oEmbed payload of an embed block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub embed_url: Option<String>,
    pub provider_name: Option<String>,
    pub html: Option<String>,
}

/// Plain text of a rich text value, blocks joined by a single space
pub fn as_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter(|b| !matches!(b.kind, BlockKind::Image | BlockKind::Embed))
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A field that may be typed as Key Text or as Rich Text in the custom type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Rich(RichText),
}

impl TextField {
    pub fn as_text(&self) -> String {
        match self {
            TextField::Plain(s) => s.clone(),
            TextField::Rich(blocks) => as_text(blocks),
        }
    }
}

impl Default for TextField {
    fn default() -> Self {
        TextField::Plain(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_blocks() {
        let json = r#"[
            {"type": "heading2", "text": "Title", "spans": []},
            {"type": "paragraph", "text": "Hello world", "spans": [
                {"start": 0, "end": 5, "type": "strong"}
            ]},
            {"type": "image", "url": "https://images.prismic.io/a.png", "alt": "A"},
            {"type": "something-new", "text": "?"}
        ]"#;
        let blocks: RichText = serde_json::from_str(json).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].kind, BlockKind::Heading2);
        assert_eq!(blocks[1].spans[0].kind, SpanKind::Strong);
        assert_eq!(blocks[2].url.as_deref(), Some("https://images.prismic.io/a.png"));
        assert_eq!(blocks[3].kind, BlockKind::Unknown);
    }

    #[test]
    fn test_as_text() {
        let blocks = vec![
            Block::plain(BlockKind::Heading2, "Intro"),
            Block::plain(BlockKind::Paragraph, "one two"),
            Block {
                url: Some("a.png".to_string()),
                ..Block::plain(BlockKind::Image, "")
            },
            Block::plain(BlockKind::ListItem, "three"),
        ];
        assert_eq!(as_text(&blocks), "Intro one two three");
        assert_eq!(as_text(&[]), "");
    }

    #[test]
    fn test_text_field_shapes() {
        let plain: TextField = serde_json::from_str(r#""Ada""#).unwrap();
        assert_eq!(plain.as_text(), "Ada");

        let rich: TextField =
            serde_json::from_str(r#"[{"type": "heading1", "text": "Hello", "spans": []}]"#)
                .unwrap();
        assert_eq!(rich.as_text(), "Hello");
    }
}
