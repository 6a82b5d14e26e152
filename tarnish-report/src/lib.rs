//! Report output for Tarnish: HTML pages, PDF conversion and Google Drive
//! upload.
pub mod drive;
pub mod error;
pub mod export;
pub mod html;
pub mod pdf;

pub use drive::{DriveUploader, ServiceAccountKey};
pub use error::ReportError;
pub use export::{report_file_name, ExportOutcome, Exporter};
pub use html::{html_escape, render_error, render_index, render_results, ReportView};
pub use pdf::PdfClient;
