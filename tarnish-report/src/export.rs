use crate::drive::{DriveUploader, ServiceAccountKey};
use crate::error::ReportError;
use crate::pdf::PdfClient;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;
use tarnish_config::{secret, ReportConfig};

/// What happened to a report after rendering.
#[derive(Debug, Default, Clone)]
pub struct ExportOutcome {
    /// Local PDF, if one is still on disk.
    pub local_path: Option<PathBuf>,
    pub drive_file_id: Option<String>,
    pub errors: Vec<String>,
}

/// Turns a rendered report into a PDF, stores it and uploads it.
pub struct Exporter {
    pdf: Option<PdfClient>,
    drive: Option<DriveUploader>,
    output_dir: PathBuf,
    append_date: bool,
    keep_local: bool,
}

impl Exporter {
    pub fn new(pdf: Option<PdfClient>, drive: Option<DriveUploader>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            pdf,
            drive,
            output_dir: output_dir.into(),
            append_date: true,
            keep_local: false,
        }
    }

    pub fn with_append_date(mut self, append: bool) -> Self {
        self.append_date = append;
        self
    }

    pub fn with_keep_local(mut self, keep: bool) -> Self {
        self.keep_local = keep;
        self
    }

    /// Build from config. Missing Drive settings disable the upload with a
    /// warning; a key file that exists but cannot be used is an error.
    pub fn from_config(cfg: &ReportConfig) -> Result<Self, ReportError> {
        let pdf = if cfg.pdf.enabled {
            Some(PdfClient::new(
                &cfg.pdf.base_url,
                secret(&cfg.pdf.token),
                Duration::from_secs(cfg.pdf.timeout_secs),
            )?)
        } else {
            None
        };

        let drive = match (
            cfg.drive.enabled,
            secret(&cfg.drive.folder_id),
            cfg.drive.credentials_path.as_deref(),
        ) {
            (false, _, _) => None,
            (true, Some(folder), Some(path)) => {
                let key = ServiceAccountKey::from_file(path)?;
                Some(DriveUploader::with_upload_url(key, folder, &cfg.drive.upload_url)?)
            }
            (true, _, _) => {
                tracing::warn!("drive.folder_id or credentials missing; Drive upload disabled");
                None
            }
        };

        Ok(Self::new(pdf, drive, cfg.output_dir.clone())
            .with_append_date(cfg.drive.append_date)
            .with_keep_local(cfg.keep_local))
    }

    pub fn enabled(&self) -> bool {
        self.pdf.is_some()
    }

    /// Render, write and upload. Never fails: problems are logged and
    /// returned in [`ExportOutcome::errors`].
    pub async fn export(&self, brand: &str, html: &str) -> ExportOutcome {
        let mut out = ExportOutcome::default();
        let Some(pdf) = &self.pdf else {
            return out;
        };

        let bytes = match pdf.render(html).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(brand, error = %e, "report.pdf.failed");
                out.errors.push(format!("PDF error: {e}"));
                return out;
            }
        };

        let today = chrono::Local::now().date_naive();
        let file_name = report_file_name(brand, self.append_date.then_some(today));
        let path = self.output_dir.join(local_file_name(&file_name));

        if let Err(e) = write_file(&path, &bytes).await {
            tracing::warn!(path = %path.display(), error = %e, "report.pdf.write_failed");
            out.errors.push(format!("PDF error: {e}"));
            return out;
        }
        tracing::info!(path = %path.display(), "report.pdf.written");
        out.local_path = Some(path.clone());

        let Some(drive) = &self.drive else {
            return out;
        };
        match drive.upload_pdf(&file_name, bytes).await {
            Ok(id) => {
                out.drive_file_id = Some(id);
                if !self.keep_local {
                    match tokio::fs::remove_file(&path).await {
                        Ok(()) => out.local_path = None,
                        Err(e) => tracing::warn!(path = %path.display(), error = %e, "report.pdf.cleanup_failed"),
                    }
                }
            }
            Err(e) => {
                tracing::warn!(file_name = %file_name, error = %e, "report.drive.failed");
                out.errors.push(format!("Upload error: {e}"));
            }
        }
        out
    }
}

async fn write_file(path: &std::path::Path, bytes: &[u8]) -> Result<(), ReportError> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Concurrent scans of one brand on one day share a report name, so the
/// on-disk copy gets a random suffix. Drive keeps the plain name.
fn local_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".pdf").unwrap_or(file_name);
    let tag = uuid::Uuid::new_v4().simple().to_string();
    format!("{stem}_{}.pdf", &tag[..8])
}

/// `<brand>[_YYYY-MM-DD].pdf`, with the brand reduced to `[A-Za-z0-9_-]`.
///
/// ```
/// use chrono::NaiveDate;
/// use tarnish_report::report_file_name;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 9);
/// assert_eq!(report_file_name("Acme Corp.", day), "Acme_Corp_2024-03-09.pdf");
/// assert_eq!(report_file_name("Acme", None), "Acme.pdf");
/// assert_eq!(report_file_name("***", None), "report.pdf");
/// ```
pub fn report_file_name(brand: &str, date: Option<NaiveDate>) -> String {
    let mut stem = String::with_capacity(brand.len());
    for c in brand.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            stem.push(c);
        } else if c.is_whitespace() && !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_');
    let stem = if stem.is_empty() { "report" } else { stem };

    match date {
        Some(d) => format!("{stem}_{}.pdf", d.format("%Y-%m-%d")),
        None => format!("{stem}.pdf"),
    }
}
