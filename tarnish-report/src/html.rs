//! Server-rendered pages: the scan form, the report and the error page.
//!
//! The report page doubles as the PDF source, so it carries its own styles
//! and no scripts.
use tarnish_common::{ClassifiedMention, GroupedResults};

/// Data shown on a rendered report.
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    pub brand: &'a str,
    pub website: Option<&'a str>,
    pub results: &'a GroupedResults,
    /// Number of unique URLs that went through classification.
    pub scanned: usize,
    /// Non-fatal problems met along the way.
    pub warnings: &'a [String],
    /// Drive id of the uploaded PDF, when the upload succeeded.
    pub drive_file_id: Option<&'a str>,
}

impl<'a> ReportView<'a> {
    pub fn new(brand: &'a str, results: &'a GroupedResults) -> Self {
        Self {
            brand,
            website: None,
            results,
            scanned: 0,
            warnings: &[],
            drive_file_id: None,
        }
    }
}

/// Render the input form.
pub fn render_index() -> String {
    let content = r#"<div class="container">
    <h1>Brand reputation scan</h1>
    <p class="muted">Searches the web, Reddit, YouTube, Bing, Yahoo and TikTok for negative mentions and summarizes them.</p>
    <form method="post" action="/search" class="scan-form">
        <label for="brand">Brand name</label>
        <input id="brand" name="brand" type="text" required>
        <label for="website">Website</label>
        <input id="website" name="website" type="text" placeholder="example.com">
        <label for="description">Business description</label>
        <textarea id="description" name="description" rows="3"></textarea>
        <label for="keyword">Extra keyword (optional)</label>
        <input id="keyword" name="keyword" type="text">
        <button type="submit">Scan</button>
    </form>
</div>"#;

    build_page("Tarnish", content)
}

/// Render the grouped report.
pub fn render_results(view: &ReportView<'_>) -> String {
    let brand = html_escape(view.brand);
    let mut content = format!(r#"<div class="container"><h1>Negative mentions of {brand}</h1>"#);

    if let Some(site) = view.website.filter(|s| !s.trim().is_empty()) {
        content.push_str(&format!(
            r#"<p class="muted">Website: {}</p>"#,
            html_escape(site.trim())
        ));
    }
    content.push_str(&format!(
        r#"<p class="muted">{} mention{} across {} scanned result{}.</p>"#,
        view.results.total(),
        plural(view.results.total()),
        view.scanned,
        plural(view.scanned),
    ));
    if let Some(id) = view.drive_file_id {
        content.push_str(&format!(
            r#"<p class="notice">PDF uploaded to Drive (file id <code>{}</code>).</p>"#,
            html_escape(id)
        ));
    }

    if view.results.is_empty() {
        content.push_str(r#"<p class="empty">No negative mentions found.</p>"#);
    }

    for (source, mentions) in view.results.iter() {
        if mentions.is_empty() {
            continue;
        }
        content.push_str(&format!(
            r#"<section class="source source-{key}"><h2>{name} <span class="count">{n}</span></h2>"#,
            key = source.as_str(),
            name = source.display_name(),
            n = mentions.len(),
        ));
        for mention in mentions {
            content.push_str(&render_mention(mention));
        }
        content.push_str("</section>");
    }

    if !view.warnings.is_empty() {
        content.push_str(r#"<details class="warnings"><summary>Some sources could not be checked</summary><ul>"#);
        for w in view.warnings {
            content.push_str(&format!("<li>{}</li>", html_escape(w)));
        }
        content.push_str("</ul></details>");
    }

    content.push_str("</div>");
    build_page(&format!("{} report", view.brand), &content)
}

fn render_mention(m: &ClassifiedMention) -> String {
    let url = html_escape(&m.url);
    format!(
        r#"<article class="mention">
    <a href="{url}" target="_blank" rel="noopener">{url}</a>
    <p>{summary}</p>
</article>"#,
        summary = html_escape(&m.summary).replace('\n', "<br>"),
    )
}

/// Render the page shown when a scan produced nothing but errors.
pub fn render_error(brand: &str, errors: &[String]) -> String {
    let mut list = String::new();
    for e in errors {
        list.push_str(&format!("<li>{}</li>", html_escape(e)));
    }
    let content = format!(
        r#"<div class="container">
    <h1>Scan failed</h1>
    <p>No results could be collected for {brand}.</p>
    <ul class="errors">{list}</ul>
    <p><a href="/">Try again</a></p>
</div>"#,
        brand = html_escape(brand),
    );
    build_page("Scan failed", &content)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; background: #fafafa; color: #222; }}
.container {{ max-width: 860px; margin: 0 auto; padding: 24px 16px; }}
h1 {{ font-size: 24px; margin-bottom: 8px; }}
h2 {{ font-size: 18px; border-bottom: 1px solid #ddd; padding-bottom: 4px; margin-top: 28px; }}
.muted {{ color: #666; font-size: 14px; }}
.count {{ background: #c62828; color: #fff; border-radius: 10px; padding: 1px 8px; font-size: 12px; vertical-align: middle; }}
.mention {{ background: #fff; border: 1px solid #e0e0e0; border-radius: 6px; padding: 10px 14px; margin: 10px 0; }}
.mention a {{ font-size: 13px; word-break: break-all; color: #1565c0; }}
.mention p {{ margin: 6px 0 0; line-height: 1.45; }}
.notice {{ background: #e8f5e9; padding: 8px 12px; border-radius: 4px; }}
.empty {{ color: #2e7d32; padding: 24px 0; }}
.warnings {{ margin-top: 32px; font-size: 13px; color: #795548; }}
.errors li {{ color: #c62828; }}
.scan-form {{ display: flex; flex-direction: column; gap: 6px; max-width: 480px; }}
.scan-form input, .scan-form textarea {{ padding: 8px; border: 1px solid #ccc; border-radius: 4px; font-size: 14px; }}
.scan-form button {{ margin-top: 12px; padding: 10px; background: #222; color: #fff; border: none; border-radius: 4px; font-size: 15px; cursor: pointer; }}
</style>
</head>
<body>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
