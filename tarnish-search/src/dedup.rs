use std::collections::HashSet;
use tarnish_common::{truncate_chars, SearchResult, UniqueItem};

pub const MAX_SNIPPET_CHARS: usize = 300;

/// Keep the first result seen for every URL, in arrival order.
///
/// The snippet falls back to the title when empty and is cut to
/// [`MAX_SNIPPET_CHARS`]. Results without a link are skipped.
pub fn dedup(results: &[SearchResult]) -> Vec<UniqueItem> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for r in results {
        let url = r.link.trim();
        if url.is_empty() || !seen.insert(url) {
            continue;
        }
        let text = if r.snippet.trim().is_empty() {
            &r.title
        } else {
            &r.snippet
        };
        out.push(UniqueItem {
            url: url.to_string(),
            snippet: truncate_chars(text.trim(), MAX_SNIPPET_CHARS),
            source: r.source,
            transcript: r.transcript.clone(),
        });
    }

    tracing::info!(input = results.len(), unique = out.len(), "search.dedup");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarnish_common::Source;

    fn hit(link: &str, source: Source) -> SearchResult {
        SearchResult {
            link: link.into(),
            title: format!("title {link}"),
            snippet: format!("snippet {link}"),
            source,
            transcript: None,
        }
    }

    #[test]
    fn first_occurrence_wins_and_order_is_kept() {
        let input = vec![
            hit("a", Source::Google),
            hit("a", Source::Reddit),
            hit("b", Source::Google),
            hit("a", Source::Youtube),
            hit("c", Source::Bing),
        ];
        let out = dedup(&input);
        let urls: Vec<_> = out.iter().map(|u| u.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
        assert_eq!(out[0].source, Source::Google);
    }

    #[test]
    fn dedup_is_idempotent() {
        let input = vec![hit("a", Source::Google), hit("b", Source::Google), hit("a", Source::Google)];
        let once = dedup(&input);
        let again: Vec<SearchResult> = once
            .iter()
            .map(|u| SearchResult {
                link: u.url.clone(),
                title: String::new(),
                snippet: u.snippet.clone(),
                source: u.source,
                transcript: None,
            })
            .collect();
        assert_eq!(dedup(&again), once);
    }

    #[test]
    fn title_fills_in_for_missing_snippet() {
        let mut r = hit("a", Source::Google);
        r.snippet = "  ".into();
        assert_eq!(dedup(&[r])[0].snippet, "title a");
    }

    #[test]
    fn snippets_are_capped() {
        let mut r = hit("a", Source::Google);
        r.snippet = "é".repeat(500);
        assert_eq!(dedup(&[r])[0].snippet.chars().count(), MAX_SNIPPET_CHARS);
    }

    #[test]
    fn empty_links_are_skipped() {
        assert!(dedup(&[hit("", Source::Tiktok)]).is_empty());
        assert!(dedup(&[]).is_empty());
    }
}
