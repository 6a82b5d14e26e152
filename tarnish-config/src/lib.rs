//! Loader for Tarnish configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (every field except secrets has one)
//! 2. YAML files and inline YAML snippets, in the order they were added
//! 3. `TARNISH__`-prefixed environment variables, `__` separating nesting
//!    levels (`TARNISH__SEARCH__MAX_RESULTS=5`)
//!
//! After merging, every string value goes through `${VAR}` expansion. Secrets
//! left unset fall back to the conventional variables (`SEARCH1_API_KEY`,
//! `APIFY_API_TOKEN`, `GEMINI_API_KEY`, `OPENAI_API_KEY`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TARNISH";

/// Phrases appended to the brand name to steer searches toward criticism.
pub const DEFAULT_NEGATIVE_KEYWORDS: &[&str] = &[
    "Scam",
    "Scammy",
    "Fraud",
    "Rip-off",
    "Fake",
    "Con",
    "Con job",
    "Complaint",
    "Complaints",
    "Terrible",
    "Horrible",
    "Awful",
    "Bad service",
    "Warning",
    "Beware",
    "Cheated",
    "Cheating",
    "Exposed",
    "Unprofessional",
    "Misleading",
    "Shady",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TarnishConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub app_name: String,
    pub filter: String,
    /// `text` or `json`.
    pub format: String,
    pub stderr: bool,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: "tarnish".into(),
            filter: "info".into(),
            format: "text".into(),
            stderr: true,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub search1api: Search1ApiConfig,
    pub tiktok: TikTokConfig,
    /// Result cap passed to every backend.
    pub max_results: u32,
    /// Per-call timeout for the search proxy.
    pub timeout_secs: u64,
    pub negative_keywords: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search1api: Search1ApiConfig::default(),
            tiktok: TikTokConfig::default(),
            max_results: 20,
            timeout_secs: 10,
            negative_keywords: DEFAULT_NEGATIVE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search1ApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Search services to query, one backend each (`google`, `reddit`,
    /// `youtube`, `x`, `bing`, `yahoo`).
    pub services: Vec<String>,
}

impl Default for Search1ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.search1api.com".into(),
            services: ["google", "reddit", "youtube", "bing", "yahoo"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TikTokConfig {
    pub enabled: bool,
    pub api_token: Option<String>,
    /// Apify actor id, `user~name` form.
    pub actor: String,
    pub base_url: String,
    /// Actor runs take far longer than a plain search call.
    pub timeout_secs: u64,
    /// Fetch subtitle files and attach transcripts to results.
    pub transcripts: bool,
}

impl Default for TikTokConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_token: None,
            actor: "clockworks~tiktok-scraper".into(),
            base_url: "https://api.apify.com/v2".into(),
            timeout_secs: 120,
            transcripts: true,
        }
    }
}

/// Which LLM API classifies mentions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Openai,
}

impl LlmProvider {
    fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash-8b",
            Self::Openai => "gpt-4o-mini",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Openai => "https://api.openai.com/v1",
        }
    }

    fn key_env(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Openai => "OPENAI_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    /// Provider default when unset.
    pub model: Option<String>,
    /// Provider default when unset.
    pub endpoint: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Items per classification prompt.
    pub batch_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            api_key: None,
            model: None,
            endpoint: None,
            temperature: 0.4,
            max_tokens: None,
            batch_size: 5,
        }
    }
}

impl LlmConfig {
    pub fn api_key(&self) -> Option<&str> {
        secret(&self.api_key)
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.provider.default_model())
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(self.provider.default_endpoint())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub pdf: PdfConfig,
    pub drive: DriveConfig,
    /// Where PDFs are written before upload.
    pub output_dir: PathBuf,
    /// Keep the local PDF after a successful upload.
    pub keep_local: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            pdf: PdfConfig::default(),
            drive: DriveConfig::default(),
            output_dir: PathBuf::from("reports"),
            keep_local: false,
        }
    }
}

/// Browserless-compatible HTML to PDF service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub enabled: bool,
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:3000".into(),
            token: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub enabled: bool,
    pub folder_id: Option<String>,
    /// Service-account key file; defaults to `GOOGLE_APPLICATION_CREDENTIALS`.
    pub credentials_path: Option<PathBuf>,
    pub append_date: bool,
    pub upload_url: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            folder_id: None,
            credentials_path: None,
            append_date: true,
            upload_url: "https://www.googleapis.com/upload/drive/v3".into(),
        }
    }
}

/// Treat empty strings and unexpanded `${VAR}` placeholders as unset.
pub fn secret(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.contains("${"))
}

impl TarnishConfig {
    fn apply_env_fallbacks(&mut self) {
        fill_from_env(&mut self.search.search1api.api_key, "SEARCH1_API_KEY");
        fill_from_env(&mut self.search.tiktok.api_token, "APIFY_API_TOKEN");
        let key_env = self.llm.provider.key_env();
        fill_from_env(&mut self.llm.api_key, key_env);
        if self.report.drive.credentials_path.is_none() {
            self.report.drive.credentials_path =
                std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from);
        }
        if self.report.drive.folder_id.is_none() {
            self.report.drive.folder_id = std::env::var("DRIVE_FOLDER_ID").ok();
        }
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    if secret(slot).is_none() {
        if let Ok(v) = std::env::var(var) {
            if !v.trim().is_empty() {
                *slot = Some(v);
            }
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TarnishConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TarnishConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TarnishConfigLoader {
    /// Start from the built-in defaults.
    ///
    /// ```
    /// use tarnish_config::TarnishConfigLoader;
    ///
    /// let config = TarnishConfigLoader::new()
    ///     .with_yaml_str("server:\n  port: 9000\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.port, 9000);
    /// assert_eq!(config.search.max_results, 20);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, for deployments configured purely
    /// through the environment.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use tarnish_config::{LlmProvider, TarnishConfigLoader};
    ///
    /// let cfg = TarnishConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: openai
    ///   api_key: "sk-test"
    ///   batch_size: 8
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.llm.batch_size, 8);
    /// assert_eq!(cfg.llm.provider, LlmProvider::Openai);
    /// assert_eq!(cfg.llm.api_key(), Some("sk-test"));
    /// assert_eq!(cfg.llm.model(), "gpt-4o-mini");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config.
    pub fn load(self) -> Result<TarnishConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: TarnishConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.apply_env_fallbacks();

        if typed.llm.batch_size == 0 {
            return Err(ConfigError::Message(
                "llm.batch_size must be at least 1".into(),
            ));
        }
        let format = typed.logging.format.trim().to_ascii_lowercase();
        if !matches!(format.as_str(), "" | "text" | "json") {
            return Err(ConfigError::Message(format!(
                "logging.format must be `text` or `json`, got `{}`",
                typed.logging.format
            )));
        }
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unresolved_placeholders_are_not_secrets() {
        assert_eq!(secret(&Some("${MISSING}".into())), None);
        assert_eq!(secret(&Some("   ".into())), None);
        assert_eq!(secret(&None), None);
        assert_eq!(secret(&Some(" k ".into())), Some("k"));
    }

    #[test]
    fn defaults_cover_the_whole_tree() {
        let cfg = TarnishConfig::default();
        assert_eq!(cfg.search.timeout_secs, 10);
        assert_eq!(cfg.search.negative_keywords.len(), 21);
        assert_eq!(cfg.llm.batch_size, 5);
        assert!((cfg.llm.temperature - 0.4).abs() < f32::EPSILON);
        assert!(cfg.report.drive.append_date);
    }
}
