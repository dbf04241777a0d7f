use std::io::{self, Write};
use std::path::{Path, PathBuf};

use picaquote_core::config::LoadOptions;
use picaquote_core::pricing::evaluate_quote;
use picaquote_export::{ClientQuoteView, ExportArtifact, ExportFormat, PdfGenerator, QuoteExporter};
use tempfile::NamedTempFile;

use crate::commands::input::load_quote;
use crate::commands::rates::currency_table;
use crate::commands::{load_config, runtime, CommandResult, EXIT_CONFIG, EXIT_EXPORT, EXIT_INPUT};

pub fn run(
    options: &LoadOptions,
    quote_path: &Path,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> CommandResult {
    let config = match load_config("export", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let rates = match config.load_rate_tables() {
        Ok(rates) => rates,
        Err(error) => {
            return CommandResult::failure("export", "rate_tables", error.to_string(), EXIT_CONFIG);
        }
    };

    let quote = match load_quote(quote_path) {
        Ok(quote) => quote,
        Err(error) => {
            return CommandResult::failure(
                "export",
                "invalid_quote",
                format!("{error:#}"),
                EXIT_INPUT,
            );
        }
    };

    let pdf = match PdfGenerator::from_config(
        config.export.template_dir.as_deref(),
        config.export.wkhtmltopdf_path.clone(),
    ) {
        Ok(pdf) => pdf,
        Err(error) => {
            return CommandResult::failure("export", "template", error.to_string(), EXIT_EXPORT);
        }
    };
    let exporter = QuoteExporter::new(pdf);

    let runtime = match runtime("export") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let currencies = currency_table(&config).await;
        let evaluation = evaluate_quote(&quote, &rates);
        let view =
            ClientQuoteView::build(&quote, &evaluation, &currencies, &config.export.company_name);
        exporter.export(format, &view).await
    });

    let artifact = match result {
        Ok(artifact) => artifact,
        Err(error) => {
            return CommandResult::failure("export", "export_failed", error.to_string(), EXIT_EXPORT);
        }
    };

    let target = output_path(output, &artifact, &quote.quote_name.0);
    let kind = artifact.kind();
    let size = artifact.len();
    if let Err(error) = write_atomically(&target, &artifact.into_bytes()) {
        return CommandResult::failure(
            "export",
            "write_output",
            format!("could not write `{}`: {error}", target.display()),
            EXIT_EXPORT,
        );
    }

    let mut message = format!("wrote {kind} ({size} bytes) to {}", target.display());
    if format == ExportFormat::Pdf && kind == "html" {
        message.push_str("; wkhtmltopdf unavailable, print the HTML to PDF from a browser");
    }
    CommandResult::success("export", message)
}

/// Writes through a sibling temp file so a failed export never leaves a
/// truncated document at `target`.
fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(directory)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|error| error.error)?;
    Ok(())
}

/// Explicit paths keep their directory and stem; the extension follows the
/// artifact so an HTML fallback is never saved as `.pdf`.
fn output_path(requested: Option<PathBuf>, artifact: &ExportArtifact, quote_name: &str) -> PathBuf {
    match requested {
        Some(path) => {
            let matches = path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension.eq_ignore_ascii_case(artifact.extension()));
            if matches {
                path
            } else {
                path.with_extension(artifact.extension())
            }
        }
        None => PathBuf::from(artifact.file_name(quote_name)),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use picaquote_export::ExportArtifact;

    use super::{output_path, write_atomically};

    #[test]
    fn html_fallback_replaces_pdf_extension() {
        let html = ExportArtifact::Html("<p></p>".to_string());
        let path = output_path(Some(PathBuf::from("out/quote.pdf")), &html, "Q-1");

        assert_eq!(path, PathBuf::from("out/quote.html"));
    }

    #[test]
    fn default_path_uses_the_quote_name() {
        let xlsx = ExportArtifact::Xlsx(Vec::new());

        assert_eq!(output_path(None, &xlsx, "Q 7"), PathBuf::from("Q_7_Client_Quote.xlsx"));
        assert_eq!(
            output_path(Some(PathBuf::from("a.XLSX")), &xlsx, "Q 7"),
            PathBuf::from("a.XLSX")
        );
    }

    #[test]
    fn atomic_write_replaces_the_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("quote.xlsx");
        fs::write(&target, b"old contents that are longer").expect("seed target");

        write_atomically(&target, b"new").expect("write");

        assert_eq!(fs::read(&target).expect("read target"), b"new");
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 1);
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("occupied");
        fs::create_dir(&target).expect("directory in the way");

        assert!(write_atomically(&target, b"pdf bytes").is_err());

        assert!(target.is_dir());
        let entries: Vec<_> = fs::read_dir(dir.path()).expect("list").collect();
        assert_eq!(entries.len(), 1, "staged file was left behind");
    }
}
