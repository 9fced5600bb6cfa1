//! Rich text to HTML serialization

use std::collections::VecDeque;

use super::{Block, BlockKind, Span, SpanData, SpanKind};
use crate::helpers::html_escape;

/// Resolve a hyperlink span to an href
///
/// Document links point at the detail route of posts; other document
/// types fall back to the site root.
pub fn resolve_link(data: &SpanData) -> String {
    match data.link_type.as_deref() {
        Some("Document") => match (data.doc_type.as_deref(), data.uid.as_deref()) {
            (Some("posts"), Some(uid)) => format!("/post/{}", uid),
            _ => "/".to_string(),
        },
        _ => data.url.clone().unwrap_or_default(),
    }
}

/// Serialize rich text as HTML
///
/// Consecutive list items are grouped into a single `<ul>` or `<ol>`.
pub fn as_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind {
            BlockKind::ListItem => Some("ul"),
            BlockKind::OrderedListItem => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                out.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        render_block(block, &mut out);
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{}>", tag));
    }

    out
}

fn render_block(block: &Block, out: &mut String) {
    let tag = match block.kind {
        BlockKind::Paragraph => "p",
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Heading4 => "h4",
        BlockKind::Heading5 => "h5",
        BlockKind::Heading6 => "h6",
        BlockKind::Preformatted => "pre",
        BlockKind::ListItem | BlockKind::OrderedListItem => "li",
        BlockKind::Image => {
            let src = block.url.as_deref().unwrap_or_default();
            let alt = block.alt.as_deref().unwrap_or_default();
            out.push_str(&format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                html_escape(src),
                html_escape(alt)
            ));
            return;
        }
        BlockKind::Embed => {
            if let Some(embed) = &block.oembed {
                out.push_str(&format!(
                    r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                    html_escape(embed.embed_url.as_deref().unwrap_or_default()),
                    html_escape(embed.kind.as_deref().unwrap_or_default()),
                    html_escape(embed.provider_name.as_deref().unwrap_or_default()),
                    embed.html.as_deref().unwrap_or_default()
                ));
            }
            return;
        }
        BlockKind::Unknown => {
            tracing::debug!("Skipping rich text block of unknown type");
            return;
        }
    };

    out.push_str(&format!("<{}>", tag));
    render_text(&block.text, &block.spans, out);
    out.push_str(&format!("</{}>", tag));
}

/// A span resolved to byte offsets in the block text
#[derive(Clone)]
struct Range<'a> {
    start: usize,
    end: usize,
    span: &'a Span,
}

fn render_text(text: &str, spans: &[Span], out: &mut String) {
    let offsets = utf16_offsets(text);
    let to_byte = |i: usize| offsets[i.min(offsets.len() - 1)];

    let ranges: Vec<Range> = spans
        .iter()
        .filter(|s| s.kind != SpanKind::Unknown)
        .map(|span| Range {
            start: to_byte(span.start),
            end: to_byte(span.end),
            span,
        })
        .filter(|r| r.start < r.end)
        .collect();

    render_ranges(text, ranges, 0, text.len(), out);
}

/// Render `text[start..end]`, nesting every range inside the one that
/// encloses its start. Ranges crossing the end of their parent are split.
fn render_ranges(text: &str, mut ranges: Vec<Range>, start: usize, end: usize, out: &mut String) {
    sort_ranges(&mut ranges);
    let mut pending: VecDeque<Range> = ranges.into();
    let mut cursor = start;

    while let Some(first) = pending.pop_front() {
        let s = first.start.max(cursor);
        let e = first.end.min(end);
        if s >= e {
            continue;
        }

        push_text(&text[cursor..s], out);

        let mut inner = Vec::new();
        let mut rest = Vec::new();
        while pending.front().is_some_and(|next| next.start < e) {
            if let Some(next) = pending.pop_front() {
                if next.end > e {
                    inner.push(Range { end: e, ..next.clone() });
                    rest.push(Range { start: e, ..next });
                } else {
                    inner.push(next);
                }
            }
        }

        open_span(first.span, out);
        render_ranges(text, inner, s, e, out);
        close_span(first.span, out);
        cursor = e;

        if !rest.is_empty() {
            rest.extend(pending.drain(..));
            sort_ranges(&mut rest);
            pending = rest.into();
        }
    }

    push_text(&text[cursor..end], out);
}

fn sort_ranges(ranges: &mut [Range]) {
    ranges.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
}

fn open_span(span: &Span, out: &mut String) {
    let default = SpanData::default();
    let data = span.data.as_ref().unwrap_or(&default);
    match span.kind {
        SpanKind::Strong => out.push_str("<strong>"),
        SpanKind::Em => out.push_str("<em>"),
        SpanKind::Hyperlink => {
            let href = html_escape(&resolve_link(data));
            match data.target.as_deref() {
                Some(target) => out.push_str(&format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    href,
                    html_escape(target)
                )),
                None => out.push_str(&format!(r#"<a href="{}">"#, href)),
            }
        }
        SpanKind::Label => out.push_str(&format!(
            r#"<span class="{}">"#,
            html_escape(data.label.as_deref().unwrap_or_default())
        )),
        SpanKind::Unknown => {}
    }
}

fn close_span(span: &Span, out: &mut String) {
    match span.kind {
        SpanKind::Strong => out.push_str("</strong>"),
        SpanKind::Em => out.push_str("</em>"),
        SpanKind::Hyperlink => out.push_str("</a>"),
        SpanKind::Label => out.push_str("</span>"),
        SpanKind::Unknown => {}
    }
}

fn push_text(text: &str, out: &mut String) {
    out.push_str(&html_escape(text).replace('\n', "<br />"));
}

/// Byte offset of every UTF-16 position in `text`, plus the end
fn utf16_offsets(text: &str) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(text.len() + 1);
    for (byte, c) in text.char_indices() {
        for _ in 0..c.len_utf16() {
            offsets.push(byte);
        }
    }
    offsets.push(text.len());
    offsets
}
