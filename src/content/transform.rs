//! CMS documents to view models

use std::collections::HashMap;

use super::schema::{PostData, PostSummaryData};
use super::{PostDetail, PostSummary, Section};
use crate::prismic::Document;
use crate::richtext;

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read `words` words, rounded up
pub fn reading_time(words: usize, words_per_minute: usize) -> usize {
    if words_per_minute == 0 {
        return 0;
    }
    words.div_ceil(words_per_minute)
}

/// Build the detail view model of a post
///
/// Every content section is rendered to HTML in order; the word count of
/// all section bodies drives the reading time estimate.
pub fn transform_post(doc: &Document<PostData>, words_per_minute: usize) -> PostDetail {
    let mut total_words = 0;
    let mut anchors: HashMap<String, usize> = HashMap::new();

    let sections = doc
        .data
        .content
        .iter()
        .map(|section| {
            total_words += count_words(&richtext::as_text(&section.body));

            let heading = section.heading.as_text();
            Section {
                anchor: unique_anchor(&heading, &mut anchors),
                html_body: richtext::as_html(&section.body),
                heading,
            }
        })
        .collect();

    PostDetail {
        uid: doc.uid.clone().unwrap_or_default(),
        first_publication_date: doc.first_publication_date.clone(),
        title: doc.data.title.as_text(),
        subtitle: doc.data.subtitle.as_text(),
        author: doc.data.author.as_text(),
        banner_url: doc.data.banner.url.clone(),
        sections,
        reading_time_minutes: reading_time(total_words, words_per_minute),
    }
}

/// Build a listing entry; documents without a uid cannot be linked to
pub fn summarize(doc: Document<PostSummaryData>) -> Option<PostSummary> {
    let Some(uid) = doc.uid else {
        tracing::warn!("Skipping post {} without uid", doc.id);
        return None;
    };

    Some(PostSummary {
        uid,
        first_publication_date: doc.first_publication_date,
        title: doc.data.title.as_text(),
        subtitle: doc.data.subtitle.as_text(),
        author: doc.data.author.as_text(),
    })
}

fn unique_anchor(heading: &str, seen: &mut HashMap<String, usize>) -> String {
    let base = match slug::slugify(heading) {
        s if s.is_empty() => "section".to_string(),
        s => s,
    };
    let count = seen.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        format!("{}-{}", base, count)
    }
}
