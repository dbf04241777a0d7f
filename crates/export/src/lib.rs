//! Client-facing quote documents.
//!
//! Renderers consume a [`ClientQuoteView`] built once from the priced quote;
//! they never recompute pricing.

pub mod pdf;
pub mod view;
pub mod workbook;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

pub use pdf::PdfGenerator;
pub use view::{ClientQuoteView, LineRow, ModuleRow};
pub use workbook::render_workbook;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(format!("unsupported export format `{other}` (expected pdf|xlsx)")),
        }
    }
}

/// A finished document. PDF export yields HTML when no converter is usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportArtifact {
    Pdf(Vec<u8>),
    Html(String),
    Xlsx(Vec<u8>),
}

impl ExportArtifact {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "application/pdf",
            Self::Html(_) => "text/html; charset=utf-8",
            Self::Xlsx(_) => XLSX_CONTENT_TYPE,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "pdf",
            Self::Html(_) => "html",
            Self::Xlsx(_) => "xlsx",
        }
    }

    pub fn kind(&self) -> &'static str {
        self.extension()
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Pdf(bytes) | Self::Xlsx(bytes) => bytes.len(),
            Self::Html(html) => html.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Pdf(bytes) | Self::Xlsx(bytes) => bytes,
            Self::Html(html) => html.into_bytes(),
        }
    }

    /// `<quote name>_Client_Quote.<ext>` with path-hostile characters replaced.
    pub fn file_name(&self, quote_name: &str) -> String {
        let stem: String = quote_name
            .trim()
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
            .collect();
        let stem = if stem.is_empty() { "quote".to_string() } else { stem };
        format!("{stem}_Client_Quote.{}", self.extension())
    }
}

/// Renders quote views in either supported format.
#[derive(Clone, Debug)]
pub struct QuoteExporter {
    pdf: PdfGenerator,
}

impl QuoteExporter {
    pub fn new(pdf: PdfGenerator) -> Self {
        Self { pdf }
    }

    pub fn pdf(&self) -> &PdfGenerator {
        &self.pdf
    }

    pub async fn export(
        &self,
        format: ExportFormat,
        view: &ClientQuoteView,
    ) -> Result<ExportArtifact, ExportError> {
        let result = match format {
            ExportFormat::Pdf => self.pdf.generate(view).await,
            ExportFormat::Xlsx => render_workbook(view).map(ExportArtifact::Xlsx),
        };

        match &result {
            Ok(artifact) => info!(
                event_name = "export.completed",
                quote_name = %view.quote_name,
                format = format.as_str(),
                artifact = artifact.kind(),
                size = artifact.len(),
                "quote document exported"
            ),
            Err(error) => error!(
                event_name = "export.failed",
                quote_name = %view.quote_name,
                format = format.as_str(),
                error = %error,
                "quote document export failed"
            ),
        }

        result
    }
}
