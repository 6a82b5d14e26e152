use serial_test::serial;
use std::{fs, path::PathBuf};
use tarnish_config::{LlmProvider, TarnishConfigLoader};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_and_placeholders_are_loaded() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
server:
  port: 9090
search:
  search1api:
    api_key: "${TEST_SEARCH_KEY}"
    services: [google, reddit]
  negative_keywords: ["Scam", "Fraud"]
llm:
  provider: openai
  api_key: "${TEST_LLM_KEY}"
  temperature: 0.2
report:
  drive:
    folder_id: "folder-123"
    append_date: false
"#;
    let p = write_yaml(&tmp, "tarnish.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("TEST_SEARCH_KEY", Some("search-secret")),
            ("TEST_LLM_KEY", Some("llm-secret")),
        ],
        || {
            let config = TarnishConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(
                config.search.search1api.api_key.as_deref(),
                Some("search-secret")
            );
            assert_eq!(config.search.search1api.services, vec!["google", "reddit"]);
            assert_eq!(config.search.negative_keywords.len(), 2);
            assert_eq!(config.llm.provider, LlmProvider::Openai);
            assert_eq!(config.llm.api_key(), Some("llm-secret"));
            assert_eq!(config.llm.endpoint(), "https://api.openai.com/v1");
            assert_eq!(config.report.drive.folder_id.as_deref(), Some("folder-123"));
            assert!(!config.report.drive.append_date);
            assert_eq!(config.search.max_results, 20);
        },
    );
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "tarnish.yaml", "search:\n  max_results: 5\n");

    temp_env::with_vars(
        [
            ("TARNISH__SEARCH__MAX_RESULTS", Some("7")),
            ("TARNISH__SERVER__HOST", Some("127.0.0.1")),
        ],
        || {
            let config = TarnishConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.search.max_results, 7);
            assert_eq!(config.server.host, "127.0.0.1");
        },
    );
}

#[test]
#[serial]
fn conventional_secret_variables_fill_gaps() {
    temp_env::with_vars(
        [
            ("SEARCH1_API_KEY", Some("s1")),
            ("APIFY_API_TOKEN", Some("apify")),
            ("GEMINI_API_KEY", Some("gem")),
            ("OPENAI_API_KEY", None::<&str>),
        ],
        || {
            let config = TarnishConfigLoader::new()
                .with_optional_file("does-not-exist.yaml")
                .load()
                .unwrap();
            assert_eq!(config.search.search1api.api_key.as_deref(), Some("s1"));
            assert_eq!(config.search.tiktok.api_token.as_deref(), Some("apify"));
            assert_eq!(config.llm.provider, LlmProvider::Gemini);
            assert_eq!(config.llm.api_key(), Some("gem"));
            assert_eq!(config.llm.model(), "gemini-1.5-flash-8b");
        },
    );
}

#[test]
#[serial]
fn zero_batch_size_is_rejected() {
    let err = TarnishConfigLoader::new()
        .with_yaml_str("llm:\n  batch_size: 0\n")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("batch_size"));
}

#[test]
#[serial]
fn unknown_log_format_is_rejected() {
    let err = TarnishConfigLoader::new()
        .with_yaml_str("logging:\n  format: xml\n")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("logging.format"));

    let cfg = TarnishConfigLoader::new()
        .with_yaml_str("logging:\n  format: JSON\n")
        .load()
        .unwrap();
    assert_eq!(cfg.logging.format, "JSON");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let res = TarnishConfigLoader::new()
        .with_file("/definitely/not/here/tarnish.yaml")
        .load();
    assert!(res.is_err());
}
