use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Platform a mention was found on.
///
/// The declaration order is the order buckets appear in reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Google,
    Reddit,
    Youtube,
    X,
    Bing,
    Yahoo,
    Tiktok,
    Instagram,
    Facebook,
    Trustpilot,
    GoogleReviews,
    Other,
}

impl Source {
    pub const ALL: [Source; 12] = [
        Source::Google,
        Source::Reddit,
        Source::Youtube,
        Source::X,
        Source::Bing,
        Source::Yahoo,
        Source::Tiktok,
        Source::Instagram,
        Source::Facebook,
        Source::Trustpilot,
        Source::GoogleReviews,
        Source::Other,
    ];

    /// Stable lower-case key, as used in config files and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Google => "google",
            Source::Reddit => "reddit",
            Source::Youtube => "youtube",
            Source::X => "x",
            Source::Bing => "bing",
            Source::Yahoo => "yahoo",
            Source::Tiktok => "tiktok",
            Source::Instagram => "instagram",
            Source::Facebook => "facebook",
            Source::Trustpilot => "trustpilot",
            Source::GoogleReviews => "google_reviews",
            Source::Other => "other",
        }
    }

    /// Human-facing heading for report sections.
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Google => "Google",
            Source::Reddit => "Reddit",
            Source::Youtube => "YouTube",
            Source::X => "X (Twitter)",
            Source::Bing => "Bing",
            Source::Yahoo => "Yahoo",
            Source::Tiktok => "TikTok",
            Source::Instagram => "Instagram",
            Source::Facebook => "Facebook",
            Source::Trustpilot => "Trustpilot",
            Source::GoogleReviews => "Google Reviews",
            Source::Other => "Other",
        }
    }

    /// Map a free-form platform label (typically LLM output) onto a source.
    ///
    /// Matching is case-insensitive substring containment; anything that does
    /// not name a known platform becomes [`Source::Other`].
    ///
    /// ```
    /// use tarnish_common::Source;
    ///
    /// assert_eq!(Source::from_label("[Reddit]"), Source::Reddit);
    /// assert_eq!(Source::from_label("Google Reviews"), Source::GoogleReviews);
    /// assert_eq!(Source::from_label("X / Twitter"), Source::X);
    /// assert_eq!(Source::from_label("some blog"), Source::Other);
    /// ```
    pub fn from_label(label: &str) -> Source {
        let s = label.trim().to_lowercase();
        if s.contains("reddit") {
            Source::Reddit
        } else if s.contains("youtube") || s.contains("youtu.be") {
            Source::Youtube
        } else if s.contains("tiktok") {
            Source::Tiktok
        } else if s.contains("instagram") {
            Source::Instagram
        } else if s.contains("facebook") {
            Source::Facebook
        } else if s.contains("trustpilot") {
            Source::Trustpilot
        } else if s.contains("google review") || s.contains("google_review") {
            Source::GoogleReviews
        } else if s.contains("google") {
            Source::Google
        } else if s.contains("bing") {
            Source::Bing
        } else if s.contains("yahoo") {
            Source::Yahoo
        } else if s.contains("twitter") || names_x(&s) {
            Source::X
        } else {
            Source::Other
        }
    }
}

// A bare "x" substring matches far too much ("linux", "next"), so X needs
// to appear as its own token.
fn names_x(s: &str) -> bool {
    s.split(|c: char| !(c.is_ascii_alphanumeric() || c == '.'))
        .any(|tok| tok == "x" || tok == "x.com")
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hit returned by a search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    pub source: Source,
    /// Spoken text of a video result, when the backend could provide it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// A deduplicated search hit, ready to be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueItem {
    pub url: String,
    pub snippet: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// A mention the LLM judged to carry negative content about the brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedMention {
    pub url: String,
    pub summary: String,
    pub source: Source,
}

/// Mentions bucketed per platform. Every [`Source`] has a bucket, possibly
/// empty, so renderers can iterate a fixed layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedResults {
    buckets: BTreeMap<Source, Vec<ClassifiedMention>>,
}

impl Default for GroupedResults {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupedResults {
    pub fn new() -> Self {
        let buckets = Source::ALL.iter().map(|s| (*s, Vec::new())).collect();
        Self { buckets }
    }

    pub fn from_mentions<I>(mentions: I) -> Self
    where
        I: IntoIterator<Item = ClassifiedMention>,
    {
        let mut grouped = Self::new();
        for m in mentions {
            grouped.push(m);
        }
        grouped
    }

    pub fn push(&mut self, mention: ClassifiedMention) {
        self.buckets.entry(mention.source).or_default().push(mention);
    }

    pub fn get(&self, source: Source) -> &[ClassifiedMention] {
        self.buckets.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All buckets in report order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (Source, &[ClassifiedMention])> {
        self.buckets.iter().map(|(s, v)| (*s, v.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
