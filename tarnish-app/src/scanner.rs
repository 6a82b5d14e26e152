//! One scan, start to finish: expand queries, search, dedup, classify,
//! group, render and export.
use std::path::PathBuf;
use std::sync::Arc;
use tarnish_common::GroupedResults;
use tarnish_llm::traits::LlmClient;
use tarnish_llm::{classify_items, BrandProfile, ClassifyOptions};
use tarnish_report::{render_results, Exporter, ReportView};
use tarnish_search::{dedup, dispatch, expand_queries, SearchBackend};

/// What the user asked to scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub brand: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub keyword: Option<String>,
}

impl ScanRequest {
    pub fn new(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub brand: String,
    pub website: Option<String>,
    pub results: GroupedResults,
    /// Unique URLs sent to classification.
    pub scanned: usize,
    /// Partial failures: backend calls, LLM batches, PDF/upload.
    pub warnings: Vec<String>,
    pub drive_file_id: Option<String>,
    pub local_pdf: Option<PathBuf>,
}

impl ScanReport {
    pub fn view(&self) -> ReportView<'_> {
        ReportView {
            brand: &self.brand,
            website: self.website.as_deref(),
            results: &self.results,
            scanned: self.scanned,
            warnings: &self.warnings,
            drive_file_id: self.drive_file_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Report(ScanReport),
    /// Nothing was found and at least one thing went wrong.
    Failed { brand: String, errors: Vec<String> },
}

pub struct Scanner {
    backends: Vec<Arc<dyn SearchBackend>>,
    llm: Arc<dyn LlmClient + Send + Sync>,
    exporter: Exporter,
    phrases: Vec<String>,
    max_results: u32,
    classify: ClassifyOptions,
}

impl Scanner {
    pub fn new(
        backends: Vec<Arc<dyn SearchBackend>>,
        llm: Arc<dyn LlmClient + Send + Sync>,
        exporter: Exporter,
        phrases: Vec<String>,
    ) -> Self {
        Self {
            backends,
            llm,
            exporter,
            phrases,
            max_results: 20,
            classify: ClassifyOptions::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_classify_options(mut self, opts: ClassifyOptions) -> Self {
        self.classify = opts;
        self
    }

    pub async fn scan(&self, req: &ScanRequest) -> ScanOutcome {
        let brand = req.brand.trim().to_string();
        if brand.is_empty() {
            return ScanOutcome::Failed {
                brand,
                errors: vec!["Brand name is required".to_string()],
            };
        }
        tracing::info!(
            brand = %brand,
            website = req.website.as_deref().unwrap_or(""),
            keyword = req.keyword.as_deref().unwrap_or(""),
            "scan.start"
        );

        let queries = expand_queries(&brand, req.keyword.as_deref(), &self.phrases);
        let searched = dispatch(&queries, &self.backends, self.max_results).await;
        let unique = dedup(&searched.results);
        let mut warnings = searched.errors;

        if unique.is_empty() && !warnings.is_empty() {
            tracing::warn!(brand = %brand, errors = warnings.len(), "scan.failed");
            return ScanOutcome::Failed {
                brand,
                errors: warnings,
            };
        }

        let profile = BrandProfile {
            name: brand.clone(),
            website: req.website.clone(),
            description: req.description.clone(),
        };
        let classified = classify_items(self.llm.as_ref(), &profile, &unique, &self.classify).await;
        warnings.extend(classified.errors);

        let mut report = ScanReport {
            brand,
            website: req.website.clone().filter(|w| !w.trim().is_empty()),
            results: GroupedResults::from_mentions(classified.mentions),
            scanned: unique.len(),
            warnings,
            drive_file_id: None,
            local_pdf: None,
        };

        if self.exporter.enabled() {
            let html = render_results(&report.view());
            let exported = self.exporter.export(&report.brand, &html).await;
            report.drive_file_id = exported.drive_file_id;
            report.local_pdf = exported.local_path;
            report.warnings.extend(exported.errors);
        }

        tracing::info!(
            brand = %report.brand,
            scanned = report.scanned,
            mentions = report.results.total(),
            warnings = report.warnings.len(),
            "scan.done"
        );
        ScanOutcome::Report(report)
    }
}
