use picaquote_core::config::{AppConfig, LoadOptions};
use picaquote_export::PdfGenerator;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_rate_tables(&config));
            checks.extend(check_pdf_export(&config));
            checks.push(check_currency_refresh(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["rate_tables", "pdf_template", "pdf_converter", "currency_refresh"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // A missing converter only downgrades PDF export to HTML, so skips do not fail the report.
    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_rate_tables(config: &AppConfig) -> DoctorCheck {
    match config.load_rate_tables() {
        Ok(rates) if rates.asset_types().is_empty() => DoctorCheck {
            name: "rate_tables",
            status: CheckStatus::Fail,
            details: "rate tables define no asset types".to_string(),
        },
        Ok(rates) => {
            let origin = match &config.pricing.rates_path {
                Some(path) => format!("from `{}`", path.display()),
                None => "built-in defaults".to_string(),
            };
            DoctorCheck {
                name: "rate_tables",
                status: CheckStatus::Pass,
                details: format!(
                    "{} asset types and {} support plans ({origin})",
                    rates.asset_types().len(),
                    rates.support_plans().len()
                ),
            }
        }
        Err(error) => {
            DoctorCheck { name: "rate_tables", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_pdf_export(config: &AppConfig) -> Vec<DoctorCheck> {
    let generator = match PdfGenerator::from_config(
        config.export.template_dir.as_deref(),
        config.export.wkhtmltopdf_path.clone(),
    ) {
        Ok(generator) => generator,
        Err(error) => {
            return vec![
                DoctorCheck {
                    name: "pdf_template",
                    status: CheckStatus::Fail,
                    details: error.to_string(),
                },
                DoctorCheck {
                    name: "pdf_converter",
                    status: CheckStatus::Skipped,
                    details: "skipped because the quote template did not load".to_string(),
                },
            ];
        }
    };

    let template = DoctorCheck {
        name: "pdf_template",
        status: CheckStatus::Pass,
        details: match &config.export.template_dir {
            Some(dir) => format!("client quote template loaded from `{}`", dir.display()),
            None => "embedded client quote template".to_string(),
        },
    };
    let converter = match generator.wkhtmltopdf_path() {
        Some(path) => DoctorCheck {
            name: "pdf_converter",
            status: CheckStatus::Pass,
            details: format!("wkhtmltopdf at `{}`", path.display()),
        },
        None => DoctorCheck {
            name: "pdf_converter",
            status: CheckStatus::Skipped,
            details: "wkhtmltopdf not found; PDF export returns printable HTML".to_string(),
        },
    };

    vec![template, converter]
}

fn check_currency_refresh(config: &AppConfig) -> DoctorCheck {
    if !config.currency.refresh_on_startup {
        return DoctorCheck {
            name: "currency_refresh",
            status: CheckStatus::Skipped,
            details: "startup refresh disabled; configured rates are used".to_string(),
        };
    }

    DoctorCheck {
        name: "currency_refresh",
        status: CheckStatus::Pass,
        details: format!("api key configured for `{}`", config.currency.api_base_url),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
