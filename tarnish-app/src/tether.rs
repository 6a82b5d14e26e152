use crate::scanner::Scanner;
use anyhow::{Context, Result};
use tarnish_config::TarnishConfig;
use tarnish_llm::{classify_options, client_from_config};
use tarnish_report::Exporter;
use tarnish_search::backends_from_config;

/// Wire the scanner's clients from config.
///
/// Missing search or upload secrets only disable those parts; the LLM is
/// required.
pub fn build_from_config(cfg: &TarnishConfig) -> Result<Scanner> {
    let backends = backends_from_config(&cfg.search).context("search backends")?;
    if backends.is_empty() {
        tracing::warn!("no search backends configured; scans will find nothing");
    }

    let llm = client_from_config(&cfg.llm).context("llm client")?;
    let exporter = Exporter::from_config(&cfg.report).context("report exporter")?;

    Ok(Scanner::new(backends, llm, exporter, cfg.search.negative_keywords.clone())
        .with_max_results(cfg.search.max_results)
        .with_classify_options(classify_options(&cfg.llm)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarnish_config::TarnishConfigLoader;

    #[test]
    fn builds_with_only_an_llm_key() {
        let cfg = TarnishConfigLoader::new()
            .with_yaml_str(
                r#"
llm:
  api_key: "test-key"
search:
  tiktok:
    enabled: false
report:
  pdf:
    enabled: false
"#,
            )
            .load()
            .unwrap();
        assert!(build_from_config(&cfg).is_ok());
    }
}
