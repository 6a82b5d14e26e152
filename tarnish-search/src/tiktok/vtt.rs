use regex::Regex;
use std::sync::LazyLock;

static CUE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Reduce a WebVTT subtitle file to its spoken text.
///
/// Header, cue numbers, timing lines and `NOTE`/`STYLE` blocks are dropped,
/// inline tags are stripped and immediately repeated lines are collapsed.
pub fn vtt_to_text(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut skipping_block = false;

    for raw in vtt.lines() {
        let line = raw.trim();
        if line.is_empty() {
            skipping_block = false;
            continue;
        }
        if skipping_block {
            continue;
        }
        if line.starts_with("WEBVTT") {
            skipping_block = true;
            continue;
        }
        if line.starts_with("NOTE") || line == "STYLE" || line == "REGION" {
            skipping_block = true;
            continue;
        }
        if line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let text = CUE_TAG.replace_all(line, "");
        let text = text.trim();
        if text.is_empty() || lines.last().is_some_and(|prev| prev == text) {
            continue;
        }
        lines.push(text.to_string());
    }

    lines.join(" ")
}
