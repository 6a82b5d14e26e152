//! Batch classification of search hits into negative-mention summaries.
//!
//! Items are sent to the model in fixed-size batches, numbered `ITEM 1..N`.
//! The model is asked for one JSON object per batch:
//!
//! ```text
//! {"items": [{"item": 1, "source": "Reddit", "summary": "..."}]}
//! ```
//!
//! Records are matched to inputs by their `item` number. Models that ignore
//! the JSON instruction usually fall back to the line grammar
//!
//! ```text
//! ITEM 1:
//! SOURCE: Reddit
//! SUMMARY: ...
//! ```
//!
//! which [`parse_item_blocks`] understands. A summary only becomes a
//! [`ClassifiedMention`] when [`is_negative_summary`] accepts it.

use crate::traits::LlmClient;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use tarnish_common::{truncate_chars, ClassifiedMention, Source, UniqueItem};

const MAX_TRANSCRIPT_CHARS: usize = 4000;

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex")
});

/// What the classifier knows about the brand being scanned.
#[derive(Debug, Clone, Default)]
pub struct BrandProfile {
    pub name: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

impl BrandProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub batch_size: usize,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            temperature: Some(0.4),
            max_tokens: None,
        }
    }
}

/// Outcome of classifying a list of items.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub mentions: Vec<ClassifiedMention>,
    /// One entry per batch whose LLM call failed.
    pub errors: Vec<String>,
    pub batches: usize,
}

/// One record recovered from a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    /// 1-based item number as printed by the model, if readable.
    pub item: Option<usize>,
    pub source: Option<String>,
    pub summary: String,
}

/// Classify `items` batch by batch, one LLM call at a time.
///
/// A failed call skips only its batch; the failure is logged and recorded in
/// [`Classification::errors`].
pub async fn classify_items(
    llm: &dyn LlmClient,
    brand: &BrandProfile,
    items: &[UniqueItem],
    opts: &ClassifyOptions,
) -> Classification {
    let batch_size = opts.batch_size.max(1);
    let mut out = Classification::default();

    for (batch_idx, batch) in items.chunks(batch_size).enumerate() {
        out.batches += 1;
        tracing::info!(
            batch = batch_idx + 1,
            items = batch.len(),
            brand = %brand.name,
            "classify.batch.start"
        );

        let prompt = build_batch_prompt(brand, batch);
        let response = match llm
            .generate(
                &prompt,
                Some(llm.default_system_prompt()),
                opts.max_tokens,
                opts.temperature,
            )
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(batch = batch_idx + 1, error = %e, "classify.batch.failed");
                out.errors
                    .push(format!("Summarization error (batch {}): {e}", batch_idx + 1));
                continue;
            }
        };

        let parsed = parse_response(&response.text);
        if parsed.len() != batch.len() {
            tracing::debug!(
                batch = batch_idx + 1,
                expected = batch.len(),
                parsed = parsed.len(),
                "classify.batch.count_mismatch"
            );
        }

        for mention in align(batch, parsed) {
            out.mentions.push(mention);
        }
    }

    tracing::info!(
        batches = out.batches,
        mentions = out.mentions.len(),
        failed_batches = out.errors.len(),
        "classify.done"
    );
    out
}

/// Build the prompt for one batch.
pub fn build_batch_prompt(brand: &BrandProfile, batch: &[UniqueItem]) -> String {
    let name = &brand.name;
    let mut prompt = format!("You're analyzing content for negative mentions of the brand \"{name}\".\n");
    if let Some(site) = brand.website.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Brand website: {}\n", site.trim()));
    }
    if let Some(desc) = brand.description.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Business description: {}\n", desc.trim()));
    }
    prompt.push_str(&format!(
        r#"
Review each item below and summarize any negative content about {name}.
If the content mentions the brand name, or something clearly referring to it, include it.
If the content is about something else, the summary must be "UNRELATED".
If it mentions the brand without anything negative, the summary must be "No negative content".
For each item name the platform it was published on (Reddit, YouTube, TikTok, X, Instagram, Facebook, Trustpilot, Google Reviews, Google, Bing, Yahoo or Other).

Respond with a single JSON object and nothing else, in exactly this shape:
{{"items": [{{"item": 1, "source": "<platform>", "summary": "<summary | No negative content | UNRELATED>"}}]}}
Include one entry per item and use the item numbers given below.
"#
    ));

    for (idx, item) in batch.iter().enumerate() {
        prompt.push_str(&format!(
            "\nITEM {}:\nURL: {}\nContent: {}\n",
            idx + 1,
            item.url,
            item.snippet
        ));
        if let Some(t) = item.transcript.as_deref().filter(|t| !t.trim().is_empty()) {
            prompt.push_str(&format!(
                "Video Transcript: {}\n",
                truncate_chars(t.trim(), MAX_TRANSCRIPT_CHARS)
            ));
        }
    }
    prompt
}

/// Parse a model response, preferring the JSON contract.
pub fn parse_response(text: &str) -> Vec<ParsedItem> {
    match parse_json_items(text) {
        Some(items) => items,
        None => parse_item_blocks(text),
    }
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    items: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    #[serde(default)]
    item: Option<Value>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

/// Decode the JSON contract. Returns `None` when the text is not JSON in one
/// of the accepted shapes, so callers can try the line grammar instead.
pub fn parse_json_items(text: &str) -> Option<Vec<ParsedItem>> {
    let body = extract_json_block(text)?;
    let wire: Vec<WireItem> = match serde_json::from_str::<WireEnvelope>(&body) {
        Ok(env) => env.items,
        Err(_) => serde_json::from_str::<Vec<WireItem>>(&body).ok()?,
    };

    let items = wire
        .into_iter()
        .filter_map(|w| {
            let summary = w.summary?.trim().to_string();
            Some(ParsedItem {
                item: w.item.as_ref().and_then(item_number),
                source: w.source.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                summary,
            })
        })
        .collect();
    Some(items)
}

fn item_number(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

fn extract_json_block(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if let Some(caps) = JSON_FENCE.captures(trimmed) {
        let inner = caps.get(1)?.as_str().trim();
        if inner.starts_with('{') || inner.starts_with('[') {
            return Some(inner.to_string());
        }
    }
    let start = trimmed.find(['{', '['])?;
    let end = trimmed.rfind(['}', ']'])?;
    (end > start).then(|| trimmed[start..=end].to_string())
}

/// Parse the `ITEM n / SOURCE: / SUMMARY:` line grammar.
///
/// The text is split on the literal `"ITEM "`; anything before the first
/// marker is ignored. Blocks without a `SUMMARY:` line yield no record.
///
/// ```
/// use tarnish_llm::classify::parse_item_blocks;
///
/// let text = "ITEM 1:\nSOURCE: Reddit\nSUMMARY: Refunds never arrive.\n\nITEM 2:\nSOURCE: Google\nSUMMARY: UNRELATED";
/// let parsed = parse_item_blocks(text);
/// assert_eq!(parsed.len(), 2);
/// assert_eq!(parsed[0].item, Some(1));
/// assert_eq!(parsed[0].source.as_deref(), Some("Reddit"));
/// assert_eq!(parsed[1].summary, "UNRELATED");
/// ```
pub fn parse_item_blocks(text: &str) -> Vec<ParsedItem> {
    text.split("ITEM ")
        .skip(1)
        .filter_map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Option<ParsedItem> {
    let item = leading_number(block);
    let mut source = None;
    let mut summary: Option<Vec<String>> = None;
    let mut in_summary = false;

    // The first line is the rest of the "ITEM n:" header.
    for raw in block.lines().skip(1) {
        let line = strip_markup(raw);
        if let Some(rest) = line.strip_prefix("SOURCE:") {
            source = Some(clean_value(rest));
            in_summary = false;
        } else if let Some(rest) = line.strip_prefix("SUMMARY:") {
            summary = Some(vec![clean_value(rest)]);
            in_summary = true;
        } else if line.starts_with("ITEM") {
            in_summary = false;
        } else if in_summary {
            if let Some(lines) = summary.as_mut() {
                lines.push(raw.trim().to_string());
            }
        }
    }

    let summary = summary?.join("\n").trim().to_string();
    Some(ParsedItem {
        item,
        source: source.filter(|s| !s.is_empty()),
        summary,
    })
}

fn strip_markup(line: &str) -> &str {
    line.trim().trim_start_matches(['*', '#', '-', ' '])
}

fn clean_value(v: &str) -> String {
    v.trim().trim_matches('*').trim().to_string()
}

fn leading_number(s: &str) -> Option<usize> {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// True when a summary reports negative content about the brand.
///
/// ```
/// use tarnish_llm::classify::is_negative_summary;
///
/// assert!(is_negative_summary("Customers report hidden fees."));
/// assert!(!is_negative_summary("No negative content found."));
/// assert!(!is_negative_summary("unrelated"));
/// assert!(!is_negative_summary("   "));
/// ```
pub fn is_negative_summary(summary: &str) -> bool {
    let lower = summary.trim().to_lowercase();
    !lower.is_empty() && !lower.contains("unrelated") && !lower.contains("no negative content")
}

/// Pair parsed records with the batch items they describe.
///
/// Records carrying an item number are matched by that number; a record
/// without one takes the number of its position. Out-of-range and repeated
/// numbers are dropped. A `SOURCE` label that names no known platform
/// becomes [`Source::Other`]; the backend's tag is used only when the
/// record has no label at all.
pub fn align(batch: &[UniqueItem], parsed: Vec<ParsedItem>) -> Vec<ClassifiedMention> {
    let mut used = HashSet::new();
    let mut out = Vec::new();

    for (pos, record) in parsed.into_iter().enumerate() {
        let number = record.item.unwrap_or(pos + 1);
        if number == 0 || number > batch.len() || !used.insert(number) {
            tracing::debug!(number, "classify.record.unmatched");
            continue;
        }
        let item = &batch[number - 1];

        if !is_negative_summary(&record.summary) {
            tracing::debug!(url = %item.url, "classify.record.not_negative");
            continue;
        }

        let source = record
            .source
            .as_deref()
            .map(Source::from_label)
            .unwrap_or(item.source);
        out.push(ClassifiedMention {
            url: item.url.clone(),
            summary: record.summary,
            source,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, source: Source) -> UniqueItem {
        UniqueItem {
            url: url.into(),
            snippet: format!("snippet for {url}"),
            source,
            transcript: None,
        }
    }

    #[test]
    fn line_grammar_recovers_every_block() {
        let text = "Here you go.\n\nITEM 1:\nSOURCE: [Reddit]\nSUMMARY: Slow refunds.\n\nITEM 2:\nSOURCE: YouTube\nSUMMARY: No negative content\n\nITEM 3:\nSOURCE: TikTok\nSUMMARY: Claims the product broke.";
        let parsed = parse_item_blocks(text);
        assert_eq!(parsed.len(), 3);
        assert_eq!(
            parsed.iter().map(|p| p.item).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );
        assert_eq!(parsed[2].summary, "Claims the product broke.");
    }

    #[test]
    fn multi_line_summaries_are_kept() {
        let text = "ITEM 1:\nSOURCE: Trustpilot\nSUMMARY: Several reviewers say:\n- billing errors\n- no support\nITEM 2:\nSOURCE: Google\nSUMMARY: UNRELATED";
        let parsed = parse_item_blocks(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed[0].summary,
            "Several reviewers say:\n- billing errors\n- no support"
        );
    }

    #[test]
    fn blocks_without_summary_are_dropped() {
        let text = "ITEM 1:\nSOURCE: Reddit\nITEM 2:\nnothing useful here\nITEM 3:\nSUMMARY: Late deliveries";
        let parsed = parse_item_blocks(text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].item, Some(3));
    }

    #[test]
    fn garbage_input_does_not_panic() {
        for text in ["", "ITEM ", "ITEM ITEM ITEM", "SUMMARY: orphan", "ITEM x:\nSUMMARY:"] {
            let _ = parse_response(text);
        }
        assert!(parse_item_blocks("no markers at all").is_empty());
    }

    #[test]
    fn markdown_decoration_is_tolerated() {
        let text = "**ITEM 1:**\n**SOURCE:** Reddit\n**SUMMARY:** Hidden fees.";
        let parsed = parse_item_blocks(text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].source.as_deref(), Some("Reddit"));
        assert_eq!(parsed[0].summary, "Hidden fees.");
    }

    #[test]
    fn json_contract_is_preferred() {
        let text = "```json\n{\"items\": [{\"item\": 2, \"source\": \"Reddit\", \"summary\": \"Refund issues\"}, {\"item\": \"1\", \"source\": \"Google\", \"summary\": \"UNRELATED\"}]}\n```";
        let parsed = parse_response(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].item, Some(2));
        assert_eq!(parsed[1].item, Some(1));
    }

    #[test]
    fn bare_json_array_is_accepted() {
        let parsed = parse_json_items(r#"[{"item": 1, "summary": "Bad"}]"#).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].source, None);
    }

    #[test]
    fn alignment_uses_item_numbers_not_positions() {
        let batch = vec![item("https://a", Source::Google), item("https://b", Source::Reddit)];
        let parsed = vec![
            ParsedItem {
                item: Some(2),
                source: Some("Reddit".into()),
                summary: "Complaints about b".into(),
            },
            ParsedItem {
                item: Some(1),
                source: Some("Trustpilot".into()),
                summary: "Complaints about a".into(),
            },
        ];
        let out = align(&batch, parsed);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://b");
        assert_eq!(out[1].url, "https://a");
        assert_eq!(out[1].source, Source::Trustpilot);
    }

    #[test]
    fn alignment_drops_out_of_range_and_duplicates() {
        let batch = vec![item("https://a", Source::Google)];
        let parsed = vec![
            ParsedItem {
                item: Some(1),
                source: None,
                summary: "first".into(),
            },
            ParsedItem {
                item: Some(1),
                source: None,
                summary: "again".into(),
            },
            ParsedItem {
                item: Some(7),
                source: None,
                summary: "out of range".into(),
            },
        ];
        let out = align(&batch, parsed);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].summary, "first");
        assert_eq!(out[0].source, Source::Google);
    }

    #[test]
    fn unknown_labels_map_to_other() {
        let batch = vec![item("https://v", Source::Tiktok)];
        let parsed = parse_item_blocks("ITEM 1:\nSOURCE: some blog\nSUMMARY: Says the app crashes");
        let out = align(&batch, parsed);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, Source::Other);
    }

    #[test]
    fn missing_label_keeps_the_backend_source() {
        let batch = vec![item("https://v", Source::Tiktok)];
        let parsed = parse_item_blocks("ITEM 1:\nSUMMARY: Says the app crashes");
        let out = align(&batch, parsed);
        assert_eq!(out[0].source, Source::Tiktok);
    }

    #[test]
    fn negative_filter_is_case_insensitive() {
        assert!(!is_negative_summary("UNRELATED"));
        assert!(!is_negative_summary("No Negative Content"));
        assert!(!is_negative_summary("This item is Unrelated to the brand"));
        assert!(is_negative_summary("Accused of misleading ads"));
    }

    #[test]
    fn prompt_numbers_items_and_includes_transcripts() {
        let mut video = item("https://tiktok.com/@u/video/1", Source::Tiktok);
        video.transcript = Some("they never shipped my order".into());
        let batch = vec![item("https://a", Source::Google), video];
        let brand = BrandProfile {
            name: "Acme".into(),
            website: Some("acme.test".into()),
            description: Some("Sells anvils".into()),
        };
        let prompt = build_batch_prompt(&brand, &batch);
        assert!(prompt.contains("\"Acme\""));
        assert!(prompt.contains("Business description: Sells anvils"));
        assert!(prompt.contains("ITEM 1:\nURL: https://a"));
        assert!(prompt.contains("ITEM 2:\nURL: https://tiktok.com/@u/video/1"));
        assert!(prompt.contains("Video Transcript: they never shipped my order"));
        assert!(prompt.contains("{\"items\": [{\"item\": 1"));
    }
}
