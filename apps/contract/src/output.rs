use std::fmt::Write as _;

use crate::error::ContractError;
use crate::options::OutputFormat;
use crate::runner::{CaseStatus, SuiteReport};

/// Renders a report in the requested format.
pub fn render(report: &SuiteReport, format: OutputFormat) -> Result<String, ContractError> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|error| ContractError::Setup(format!("failed to encode report: {error}"))),
    }
}

fn render_text(report: &SuiteReport) -> String {
    let mut rendered = String::new();
    for case in &report.cases {
        let label = match case.status {
            CaseStatus::Passed => "PASS",
            CaseStatus::Failed => "FAIL",
            CaseStatus::Skipped => "SKIP",
        };
        let _ = write!(
            rendered,
            "{label}  {:<10} {} ({} ms)",
            case.group, case.name, case.elapsed_ms
        );
        if let Some(detail) = &case.detail {
            let _ = write!(rendered, "\n      {detail}");
        }
        rendered.push('\n');
    }

    let _ = write!(
        rendered,
        "\n{} passed, {} failed, {} skipped",
        report.passed(),
        report.failed(),
        report.skipped()
    );
    rendered
}
