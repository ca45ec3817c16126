// Transcript export: plain-text report → wrapped, paginated PDF on disk.
// PDF assembly is CPU-bound and writes a file, so callers run `write_report`
// inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod pdf;
pub mod report;

use std::path::PathBuf;

use tracing::info;

use crate::errors::ExportError;

pub use pdf::PdfLayout;
pub use report::{build_report, REPORT_TITLE};

/// Where and how the report is written.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub path: PathBuf,
    pub layout: PdfLayout,
}

impl ExportSettings {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            layout: PdfLayout::default(),
        }
    }
}

/// Renders the report text and saves it at `settings.path`, creating parent
/// directories as needed. Returns the written path.
pub fn write_report(text: &str, settings: &ExportSettings) -> Result<PathBuf, ExportError> {
    let bytes = pdf::render_pdf(REPORT_TITLE, text, &settings.layout)?;

    if let Some(parent) = settings.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&settings.path, &bytes)?;

    info!("Report saved to {} ({} bytes)", settings.path.display(), bytes.len());
    Ok(settings.path.clone())
}
