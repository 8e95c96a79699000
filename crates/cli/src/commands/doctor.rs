use std::path::{Path, PathBuf};

use bundlewise_core::config::{AppConfig, LoadOptions};
use bundlewise_core::BasketSanitizer;
use bundlewise_store::JsonFileOrderSource;
use serde::Serialize;

use crate::commands::{escape_json, CommandResult};

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

#[derive(Clone, Debug, Default)]
pub struct DoctorArgs {
    pub json: bool,
    pub config_path: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn run(args: DoctorArgs) -> CommandResult {
    let report = build_report(&args);
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if args.json {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(args: &DoctorArgs) -> DoctorReport {
    let mut checks = Vec::new();
    let options = LoadOptions {
        require_file: args.config_path.is_some(),
        config_path: args.config_path.clone(),
        ..LoadOptions::default()
    };

    let config = match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: format!(
                    "min_support={} min_confidence={} min_lift={} max_level={}",
                    config.mining.min_support,
                    config.mining.min_confidence,
                    config.mining.min_lift,
                    config.mining.max_level
                ),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            None
        }
    };

    checks.push(match (&args.input, &config) {
        (None, _) => skipped("order_input", "no --input given"),
        (Some(_), None) => skipped("order_input", "skipped because configuration did not load"),
        (Some(path), Some(config)) => check_order_input(path, config),
    });
    checks.push(match &args.output {
        None => skipped("suggestion_output", "no --output given"),
        Some(path) => check_output_target(path),
    });

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, details: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: details.to_string() }
}

fn check_order_input(path: &Path, config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "order_input",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    match runtime.block_on(JsonFileOrderSource::new(path).read_records()) {
        Ok(records) => {
            let sanitizer = BasketSanitizer::new(
                config.sanitation.max_basket_size,
                config.sanitation.drop_empty_baskets,
            );
            let transactions = records.into_iter().map(|record| record.into_transaction()).collect();
            let (_, report) = sanitizer.sanitize(transactions);
            DoctorCheck {
                name: "order_input",
                status: CheckStatus::Pass,
                details: format!(
                    "{} orders, {} usable baskets, {} truncated, {} empty dropped",
                    report.input_baskets,
                    report.output_baskets,
                    report.truncated,
                    report.dropped_empty
                ),
            }
        }
        Err(error) => {
            DoctorCheck { name: "order_input", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_output_target(path: &Path) -> DoctorCheck {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    match parent {
        Some(dir) if !dir.is_dir() => DoctorCheck {
            name: "suggestion_output",
            status: CheckStatus::Fail,
            details: format!("directory `{}` does not exist", dir.display()),
        },
        _ => DoctorCheck {
            name: "suggestion_output",
            status: CheckStatus::Pass,
            details: format!("suggestions will be written to `{}`", path.display()),
        },
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
