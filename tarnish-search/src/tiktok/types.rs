use serde::{Deserialize, Serialize};

/// Input for the TikTok scraper actor, keyword search mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokSearchInput {
    pub search_queries: Vec<String>,
    pub results_per_page: u32,
    pub search_section: String,
    pub proxy_configuration: ProxyConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfiguration {
    pub use_apify_proxy: bool,
}

impl TikTokSearchInput {
    pub fn videos(query: &str, results_per_page: u32) -> Self {
        Self {
            search_queries: vec![query.to_string()],
            results_per_page,
            search_section: "/video".into(),
            proxy_configuration: ProxyConfiguration {
                use_apify_proxy: true,
            },
        }
    }
}

/// A single TikTok video from the actor's dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokPost {
    pub id: Option<String>,
    pub text: Option<String>,
    pub web_video_url: Option<String>,
    pub video_meta: Option<VideoMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMeta {
    #[serde(default)]
    pub subtitle_links: Vec<SubtitleLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleLink {
    pub language: Option<String>,
    pub download_link: Option<String>,
}

impl TikTokPost {
    /// Subtitle file to use as the transcript, English first.
    pub fn subtitle_url(&self) -> Option<&str> {
        let links = &self.video_meta.as_ref()?.subtitle_links;
        let usable = || links.iter().filter(|l| l.download_link.is_some());
        usable()
            .find(|l| {
                l.language
                    .as_deref()
                    .is_some_and(|lang| lang.to_ascii_lowercase().starts_with("en"))
            })
            .or_else(|| usable().next())
            .and_then(|l| l.download_link.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_serializes_in_actor_shape() {
        let v = serde_json::to_value(TikTokSearchInput::videos("Acme Scam", 20)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "searchQueries": ["Acme Scam"],
                "resultsPerPage": 20,
                "searchSection": "/video",
                "proxyConfiguration": { "useApifyProxy": true }
            })
        );
    }

    #[test]
    fn english_subtitles_are_preferred() {
        let post: TikTokPost = serde_json::from_value(serde_json::json!({
            "webVideoUrl": "https://www.tiktok.com/@a/video/1",
            "videoMeta": { "subtitleLinks": [
                { "language": "spa-ES", "downloadLink": "https://cdn/es.vtt" },
                { "language": "eng-US", "downloadLink": "https://cdn/en.vtt" }
            ]}
        }))
        .unwrap();
        assert_eq!(post.subtitle_url(), Some("https://cdn/en.vtt"));
    }

    #[test]
    fn any_subtitle_beats_none() {
        let post: TikTokPost = serde_json::from_value(serde_json::json!({
            "videoMeta": { "subtitleLinks": [
                { "language": "fra-FR", "downloadLink": "https://cdn/fr.vtt" }
            ]}
        }))
        .unwrap();
        assert_eq!(post.subtitle_url(), Some("https://cdn/fr.vtt"));
        assert_eq!(TikTokPost::default().subtitle_url(), None);
    }
}
