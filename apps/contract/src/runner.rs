use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::client::ContractClient;
use crate::error::{ContractError, ContractResult};
use crate::fixtures::ProbeContext;
use crate::options::{ProbeGroup, SuiteOptions};
use crate::probes;

/// Verdict of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Every assertion held.
    Passed,
    /// An assertion, decode or transport failure halted the case.
    Failed,
    /// The group was selected but could not run with the given options.
    Skipped,
}

/// Outcome of one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    /// Group the case belongs to.
    pub group: ProbeGroup,
    /// Behaviour the case checks.
    pub name: String,
    /// Verdict.
    pub status: CaseStatus,
    /// Failure or skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Wall time, cleanup excluded.
    pub elapsed_ms: u64,
}

/// Outcomes of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    /// Cases in execution order.
    pub cases: Vec<CaseOutcome>,
}

impl SuiteReport {
    fn count(&self, status: CaseStatus) -> usize {
        self.cases.iter().filter(|case| case.status == status).count()
    }

    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(CaseStatus::Passed)
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(CaseStatus::Failed)
    }

    /// Number of skipped groups.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(CaseStatus::Skipped)
    }

    /// Whether no case failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Sequential case executor shared by the probe groups.
#[derive(Debug)]
pub struct Runner {
    context: ProbeContext,
    report: SuiteReport,
}

impl Runner {
    /// Options of the run.
    #[must_use]
    pub fn options(&self) -> &SuiteOptions {
        &self.context.options
    }

    /// Runs one case, records its verdict and deletes its fixtures.
    pub async fn case<F>(&mut self, group: ProbeGroup, name: &str, probe: F)
    where
        F: AsyncFnOnce(&mut ProbeContext) -> ContractResult<()>,
    {
        let started = Instant::now();
        let result = probe(&mut self.context).await;
        let elapsed_ms = duration_ms(started.elapsed());
        let fixture_count = self.context.fixtures.len();
        self.context.cleanup().await;

        let (status, detail) = match result {
            Ok(()) => {
                info!(group = %group, case = name, elapsed_ms, fixture_count, "case passed");
                (CaseStatus::Passed, None)
            }
            Err(error) => {
                warn!(group = %group, case = name, elapsed_ms, error = %error, "case failed");
                (CaseStatus::Failed, Some(error.to_string()))
            }
        };

        self.report.cases.push(CaseOutcome {
            group,
            name: name.to_owned(),
            status,
            detail,
            elapsed_ms,
        });
    }

    fn skip(&mut self, group: ProbeGroup, reason: &str) {
        info!(group = %group, reason, "group skipped");
        self.report.cases.push(CaseOutcome {
            group,
            name: format!("{group} probes"),
            status: CaseStatus::Skipped,
            detail: Some(reason.to_owned()),
            elapsed_ms: 0,
        });
    }
}

/// Runs every selected group against the configured deployment.
pub async fn run_suite(options: SuiteOptions) -> Result<SuiteReport, ContractError> {
    let client = ContractClient::new(&options)?;
    let mut runner = Runner {
        context: ProbeContext::new(client, options),
        report: SuiteReport::default(),
    };

    for group in ProbeGroup::ALL {
        if !runner.options().selects(group) {
            continue;
        }

        if let Some(reason) = runner.options().skip_reason(group) {
            runner.skip(group, reason);
            continue;
        }

        info!(group = %group, "running group");
        match group {
            ProbeGroup::Health => probes::health::run(&mut runner).await,
            ProbeGroup::Projects => probes::projects::run(&mut runner).await,
            ProbeGroup::Resources => probes::resources::run(&mut runner).await,
            ProbeGroup::Tasks => probes::tasks::run(&mut runner).await,
            ProbeGroup::Governance => probes::governance::run(&mut runner).await,
            ProbeGroup::Reports => probes::reports::run(&mut runner).await,
            ProbeGroup::Audit => probes::audit::run(&mut runner).await,
            ProbeGroup::Auth => probes::auth::run(&mut runner).await,
            ProbeGroup::Ui => probes::ui::run(&mut runner).await,
            ProbeGroup::Toolchain => probes::toolchain::run(&mut runner).await,
        }
    }

    let report = runner.report;
    info!(
        passed = report.passed(),
        failed = report.failed(),
        skipped = report.skipped(),
        "contract suite finished"
    );
    Ok(report)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
