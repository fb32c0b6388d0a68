//! HTML to PDF rendering with scoped temporary files.
//!
//! [`html_to_pdf`] writes the markup into a fresh [`ScopedReport`]
//! directory, asks a [`DocumentRenderer`] to produce the PDF next to it and
//! reads the bytes back into memory. The directory is removed when the
//! `ScopedReport` drops, so nothing outlives the request on any exit path.

use crate::error::Result;
use crate::output_parser::error::truncate;
use crate::AnalysisError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

/// Name used for rendering failures in [`AnalysisError::BackendUnavailable`].
pub const RENDERER_BACKEND: &str = "renderer";

/// Converts an HTML file into a PDF file.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, html: &Path, pdf: &Path) -> Result<()>;
}

/// Runs an external converter such as `wkhtmltopdf`.
///
/// `{input}` and `{output}` in the argument list are replaced by the HTML
/// and PDF paths.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `wkhtmltopdf --quiet {input} {output}`.
    pub fn wkhtmltopdf() -> Self {
        Self::new(
            "wkhtmltopdf",
            vec!["--quiet".into(), "{input}".into(), "{output}".into()],
        )
    }

    fn expand_args(&self, html: &Path, pdf: &Path) -> Vec<String> {
        let input = html.to_string_lossy();
        let output = pdf.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::wkhtmltopdf()
    }
}

#[async_trait]
impl DocumentRenderer for CommandRenderer {
    async fn render(&self, html: &Path, pdf: &Path) -> Result<()> {
        let args = self.expand_args(html, pdf);
        debug!(program = %self.program, ?args, "running document renderer");

        // A dropped request must not leave the converter running against
        // files the scoped report has already removed.
        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AnalysisError::backend(
                    RENDERER_BACKEND,
                    format!("failed to run '{}': {}", self.program, e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::backend(
                RENDERER_BACKEND,
                format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    truncate(stderr.trim(), 500)
                ),
            ));
        }
        Ok(())
    }
}

/// A private temporary directory holding `report.html` and `report.pdf`.
///
/// Both files are deleted together with the directory on drop.
#[derive(Debug)]
pub struct ScopedReport {
    dir: TempDir,
    html_path: PathBuf,
    pdf_path: PathBuf,
}

impl ScopedReport {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("niche-report-").tempdir()?;
        let html_path = dir.path().join("report.html");
        let pdf_path = dir.path().join("report.pdf");
        Ok(Self {
            dir,
            html_path,
            pdf_path,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn html_path(&self) -> &Path {
        &self.html_path
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub async fn write_html(&self, html: &str) -> Result<()> {
        tokio::fs::write(&self.html_path, html).await?;
        Ok(())
    }

    /// Read the rendered PDF. A renderer that reported success without
    /// producing a file counts as a rendering failure.
    pub async fn read_pdf(&self) -> Result<Vec<u8>> {
        match tokio::fs::read(&self.pdf_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AnalysisError::backend(
                RENDERER_BACKEND,
                "renderer produced no PDF",
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Render `html` to PDF bytes through `renderer`.
pub async fn html_to_pdf(renderer: &dyn DocumentRenderer, html: &str) -> Result<Vec<u8>> {
    let report = ScopedReport::new()?;
    report.write_html(html).await?;
    renderer.render(report.html_path(), report.pdf_path()).await?;
    let bytes = report.read_pdf().await?;
    info!(bytes = bytes.len(), "report rendered");
    Ok(bytes)
}
