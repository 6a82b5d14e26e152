//! Tarnish web app: the scan pipeline and the HTTP front end around it.
pub mod scanner;
pub mod server;
pub mod tether;

pub use scanner::{ScanOutcome, ScanReport, ScanRequest, Scanner};
pub use server::{router, AppState};
pub use tether::build_from_config;
