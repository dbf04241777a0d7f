//! Client quote PDF rendering.
//!
//! The quote is rendered to HTML through a Tera template and converted with
//! wkhtmltopdf when it is available. Without a working converter the HTML is
//! returned for browser printing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::view::{ClientQuoteView, VALIDITY_NOTE};
use crate::{ExportArtifact, ExportError};

pub const CLIENT_QUOTE_TEMPLATE: &str = "client_quote.html.tera";

/// Register custom Tera filters used by quote templates.
///
/// - `yn`: renders a boolean as `Y` or `N`, e.g. `module.included | yn`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("yn", tera_yn_filter);
}

fn tera_yn_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let flag = match value {
        tera::Value::Bool(flag) => *flag,
        tera::Value::Null => false,
        _ => return Err(tera::Error::msg("yn filter expects a boolean input")),
    };
    Ok(tera::Value::String(if flag { "Y" } else { "N" }.to_string()))
}

#[derive(Clone, Debug)]
pub struct PdfGenerator {
    tera: Tera,
    wkhtmltopdf_path: Option<PathBuf>,
}

impl PdfGenerator {
    /// Loads templates from `template_dir`, which must provide
    /// `client_quote.html.tera`.
    pub fn new(template_dir: &Path, wkhtmltopdf_path: Option<PathBuf>) -> Result<Self, ExportError> {
        let glob = format!("{}/**/*", template_dir.display());
        let mut tera = Tera::new(&glob).map_err(|e| ExportError::Template(e.to_string()))?;
        if !tera.get_template_names().any(|name| name == CLIENT_QUOTE_TEMPLATE) {
            return Err(ExportError::Template(format!(
                "`{CLIENT_QUOTE_TEMPLATE}` not found in {}",
                template_dir.display()
            )));
        }
        prepare(&mut tera);

        Ok(Self { tera, wkhtmltopdf_path: resolve_wkhtmltopdf(wkhtmltopdf_path) })
    }

    /// Generator with the built-in client quote template.
    pub fn with_embedded_templates(wkhtmltopdf_path: Option<PathBuf>) -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            CLIENT_QUOTE_TEMPLATE,
            include_str!("../templates/client_quote.html.tera"),
        )
        .map_err(|e| ExportError::Template(e.to_string()))?;
        prepare(&mut tera);

        Ok(Self { tera, wkhtmltopdf_path: resolve_wkhtmltopdf(wkhtmltopdf_path) })
    }

    /// Builds from optional configuration, falling back to the embedded template.
    pub fn from_config(
        template_dir: Option<&Path>,
        wkhtmltopdf_path: Option<PathBuf>,
    ) -> Result<Self, ExportError> {
        match template_dir {
            Some(dir) => Self::new(dir, wkhtmltopdf_path),
            None => Self::with_embedded_templates(wkhtmltopdf_path),
        }
    }

    /// Disables PDF conversion so `generate` always yields HTML.
    pub fn html_only(mut self) -> Self {
        self.wkhtmltopdf_path = None;
        self
    }

    pub fn wkhtmltopdf_path(&self) -> Option<&Path> {
        self.wkhtmltopdf_path.as_deref()
    }

    pub fn render_html(&self, view: &ClientQuoteView) -> Result<String, ExportError> {
        let mut context = Context::new();
        context.insert("quote", view);
        context.insert("currency_note", &view.currency_note());
        context.insert("validity_note", VALIDITY_NOTE);
        context.insert("tax_note", &view.tax_note());

        self.tera
            .render(CLIENT_QUOTE_TEMPLATE, &context)
            .map_err(|e| ExportError::Template(e.to_string()))
    }

    /// Renders the quote, as PDF when wkhtmltopdf converts successfully.
    pub async fn generate(&self, view: &ClientQuoteView) -> Result<ExportArtifact, ExportError> {
        let html = self.render_html(view)?;

        let Some(wkhtmltopdf) = self.wkhtmltopdf_path.as_deref() else {
            return Ok(ExportArtifact::Html(html));
        };

        match convert_html_to_pdf(&html, wkhtmltopdf).await {
            Ok(pdf_bytes) => Ok(ExportArtifact::Pdf(pdf_bytes)),
            Err(e) => {
                warn!(
                    event_name = "export.pdf.fallback_html",
                    quote_name = %view.quote_name,
                    error = %e,
                    "PDF conversion failed, falling back to HTML"
                );
                Ok(ExportArtifact::Html(html))
            }
        }
    }
}

fn prepare(tera: &mut Tera) {
    tera.autoescape_on(vec![".html.tera", ".html"]);
    register_template_filters(tera);
}

fn resolve_wkhtmltopdf(configured: Option<PathBuf>) -> Option<PathBuf> {
    let path = configured.filter(|path| path.exists()).or_else(|| which::which("wkhtmltopdf").ok());
    match &path {
        Some(path) => info!(path = %path.display(), "wkhtmltopdf found"),
        None => warn!("wkhtmltopdf not found in PATH - PDF export will return HTML"),
    }
    path
}

async fn convert_html_to_pdf(html: &str, wkhtmltopdf_path: &Path) -> Result<Vec<u8>, ExportError> {
    let temp_dir = std::env::temp_dir();
    let stem = uuid::Uuid::new_v4();
    let html_path = temp_dir.join(format!("quote_{stem}.html"));
    let pdf_path = temp_dir.join(format!("quote_{stem}.pdf"));

    let result = run_wkhtmltopdf(html, wkhtmltopdf_path, &html_path, &pdf_path).await;

    let _ = tokio::fs::remove_file(&html_path).await;
    let _ = tokio::fs::remove_file(&pdf_path).await;

    if let Ok(pdf_bytes) = &result {
        info!(size = pdf_bytes.len(), "PDF generated successfully");
    }
    result
}

async fn run_wkhtmltopdf(
    html: &str,
    wkhtmltopdf_path: &Path,
    html_path: &Path,
    pdf_path: &Path,
) -> Result<Vec<u8>, ExportError> {
    tokio::fs::write(html_path, html).await?;

    let output = Command::new(wkhtmltopdf_path)
        .arg("--page-size")
        .arg("A4")
        .arg("--margin-top")
        .arg("10mm")
        .arg("--margin-bottom")
        .arg("10mm")
        .arg("--margin-left")
        .arg("10mm")
        .arg("--margin-right")
        .arg("10mm")
        .arg("--encoding")
        .arg("utf-8")
        .arg("--quiet")
        .arg(html_path)
        .arg(pdf_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(stderr = %stderr, "wkhtmltopdf failed");
        return Err(ExportError::Conversion(stderr.to_string()));
    }

    Ok(tokio::fs::read(pdf_path).await?)
}

/// Check if wkhtmltopdf is available
pub fn is_wkhtmltopdf_available() -> bool {
    which::which("wkhtmltopdf").is_ok()
}
