use chrono::{DateTime, Utc};
use gerbil_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::project::percentage;

/// Default minimum pass rate, in percent.
pub const DEFAULT_MIN_PASS_RATE: f64 = 95.0;
/// Default maximum number of open critical defects.
pub const DEFAULT_MAX_CRITICAL_DEFECTS: u32 = 0;
/// Default minimum test coverage, in percent.
pub const DEFAULT_MIN_TEST_COVERAGE: f64 = 80.0;

fn validate_percentage(field: &str, value: f64) -> AppResult<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::Validation(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }

    Ok(value)
}

/// Release thresholds configured for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGate {
    /// Project storage identifier.
    pub project_id: Uuid,
    /// Minimum pass rate, in percent.
    pub min_pass_rate: f64,
    /// Maximum tolerated critical defects.
    pub max_critical_defects: u32,
    /// Minimum coverage, in percent.
    pub min_test_coverage: f64,
    /// True when no gate has been stored and defaults apply.
    pub is_default: bool,
    /// Last write time, absent for defaults.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input payload for storing a gate.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityGateInput {
    /// Project storage identifier.
    pub project_id: Uuid,
    /// Minimum pass rate; defaults when absent.
    pub min_pass_rate: Option<f64>,
    /// Maximum critical defects; defaults when absent.
    pub max_critical_defects: Option<i64>,
    /// Minimum coverage; defaults when absent.
    pub min_test_coverage: Option<f64>,
}

impl QualityGate {
    /// Returns the gate that applies when a project has none stored.
    #[must_use]
    pub fn defaults(project_id: Uuid) -> Self {
        Self {
            project_id,
            min_pass_rate: DEFAULT_MIN_PASS_RATE,
            max_critical_defects: DEFAULT_MAX_CRITICAL_DEFECTS,
            min_test_coverage: DEFAULT_MIN_TEST_COVERAGE,
            is_default: true,
            updated_at: None,
        }
    }

    /// Creates a validated, stored gate.
    pub fn new(input: QualityGateInput, now: DateTime<Utc>) -> AppResult<Self> {
        let max_critical_defects = match input.max_critical_defects {
            Some(value) => u32::try_from(value).map_err(|_| {
                AppError::Validation(format!(
                    "max_critical_defects must be a non-negative integer, got {value}"
                ))
            })?,
            None => DEFAULT_MAX_CRITICAL_DEFECTS,
        };

        Ok(Self {
            project_id: input.project_id,
            min_pass_rate: validate_percentage(
                "min_pass_rate",
                input.min_pass_rate.unwrap_or(DEFAULT_MIN_PASS_RATE),
            )?,
            max_critical_defects,
            min_test_coverage: validate_percentage(
                "min_test_coverage",
                input.min_test_coverage.unwrap_or(DEFAULT_MIN_TEST_COVERAGE),
            )?,
            is_default: false,
            updated_at: Some(now),
        })
    }

    /// Evaluates observed metrics against this gate.
    ///
    /// A missing coverage figure fails the coverage criterion.
    #[must_use]
    pub fn evaluate(&self, metrics: &GateMetrics, now: DateTime<Utc>) -> GateEvaluation {
        let criteria = vec![
            GateCriterionResult {
                criterion: GateCriterion::PassRate,
                threshold: self.min_pass_rate,
                actual: Some(metrics.pass_rate_pct),
                passed: metrics.pass_rate_pct >= self.min_pass_rate,
            },
            GateCriterionResult {
                criterion: GateCriterion::CriticalDefects,
                threshold: f64::from(self.max_critical_defects),
                actual: Some(f64::from(metrics.critical_defects)),
                passed: metrics.critical_defects <= self.max_critical_defects,
            },
            GateCriterionResult {
                criterion: GateCriterion::TestCoverage,
                threshold: self.min_test_coverage,
                actual: metrics.test_coverage_pct,
                passed: metrics
                    .test_coverage_pct
                    .is_some_and(|coverage| coverage >= self.min_test_coverage),
            },
        ];

        GateEvaluation {
            project_id: self.project_id,
            passed: criteria.iter().all(|criterion| criterion.passed),
            criteria,
            evaluated_at: now,
        }
    }
}

/// Observed quality metrics a gate is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateMetrics {
    /// Pass rate, in percent.
    pub pass_rate_pct: f64,
    /// Open critical defects.
    pub critical_defects: u32,
    /// Coverage, in percent.
    pub test_coverage_pct: Option<f64>,
}

impl GateMetrics {
    /// Creates validated metrics.
    pub fn new(
        pass_rate_pct: f64,
        critical_defects: i64,
        test_coverage_pct: Option<f64>,
    ) -> AppResult<Self> {
        Ok(Self {
            pass_rate_pct: validate_percentage("pass_rate", pass_rate_pct)?,
            critical_defects: u32::try_from(critical_defects).map_err(|_| {
                AppError::Validation(format!(
                    "critical_defects must be a non-negative integer, got {critical_defects}"
                ))
            })?,
            test_coverage_pct: test_coverage_pct
                .map(|value| validate_percentage("test_coverage", value))
                .transpose()?,
        })
    }
}

/// Gate criterion identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCriterion {
    /// Pass rate floor.
    PassRate,
    /// Critical defect ceiling.
    CriticalDefects,
    /// Coverage floor.
    TestCoverage,
}

impl GateCriterion {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassRate => "pass_rate",
            Self::CriticalDefects => "critical_defects",
            Self::TestCoverage => "test_coverage",
        }
    }
}

/// Outcome of one gate criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateCriterionResult {
    /// Which criterion.
    pub criterion: GateCriterion,
    /// Configured threshold.
    pub threshold: f64,
    /// Observed value, absent when not measured.
    pub actual: Option<f64>,
    /// Whether the criterion passed.
    pub passed: bool,
}

impl GateCriterionResult {
    /// One-line explanation for a failed criterion.
    #[must_use]
    pub fn describe_failure(&self) -> String {
        match (self.criterion, self.actual) {
            (GateCriterion::PassRate, Some(actual)) => format!(
                "pass rate {actual:.1}% is below the {:.1}% gate",
                self.threshold
            ),
            (GateCriterion::CriticalDefects, Some(actual)) => format!(
                "{actual} critical defects exceed the limit of {}",
                self.threshold
            ),
            (GateCriterion::TestCoverage, Some(actual)) => format!(
                "test coverage {actual:.1}% is below the {:.1}% gate",
                self.threshold
            ),
            (criterion, None) => format!("{} was not measured", criterion.as_str()),
        }
    }
}

/// Result of checking a project's metrics against its gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateEvaluation {
    /// Project storage identifier.
    pub project_id: Uuid,
    /// True when every criterion passed.
    pub passed: bool,
    /// Per-criterion outcomes.
    pub criteria: Vec<GateCriterionResult>,
    /// Evaluation time.
    pub evaluated_at: DateTime<Utc>,
}

impl GateEvaluation {
    /// Failure explanations, one per failed criterion.
    #[must_use]
    pub fn blocking_issues(&self) -> Vec<String> {
        self.criteria
            .iter()
            .filter(|criterion| !criterion.passed)
            .map(GateCriterionResult::describe_failure)
            .collect()
    }
}

/// Aggregated result of one test execution cycle for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRunSummary {
    /// Storage identifier.
    pub id: Uuid,
    /// Project storage identifier.
    pub project_id: Uuid,
    /// When the cycle ran.
    pub executed_at: DateTime<Utc>,
    /// Planned test cases.
    pub total_tests: u32,
    /// Passed cases.
    pub passed: u32,
    /// Failed cases.
    pub failed: u32,
    /// Cases not executed.
    pub not_run: u32,
    /// Open critical defects at the end of the cycle.
    pub critical_defects: u32,
    /// Measured coverage, in percent.
    pub test_coverage_pct: Option<f64>,
    /// Recording time.
    pub created_at: DateTime<Utc>,
}

/// Input payload for recording a test run.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRunInput {
    /// Project storage identifier.
    pub project_id: Uuid,
    /// When the cycle ran; defaults to now.
    pub executed_at: Option<DateTime<Utc>>,
    /// Planned cases; defaults to passed + failed + not_run.
    pub total_tests: Option<i64>,
    /// Passed cases.
    pub passed: i64,
    /// Failed cases.
    pub failed: i64,
    /// Cases not executed.
    pub not_run: Option<i64>,
    /// Open critical defects.
    pub critical_defects: Option<i64>,
    /// Measured coverage.
    pub test_coverage_pct: Option<f64>,
}

fn count(field: &str, value: i64) -> AppResult<u32> {
    u32::try_from(value).map_err(|_| {
        AppError::Validation(format!("{field} must be a non-negative integer, got {value}"))
    })
}

impl TestRunSummary {
    /// Creates a validated run summary.
    pub fn new(input: TestRunInput, now: DateTime<Utc>) -> AppResult<Self> {
        let passed = count("passed", input.passed)?;
        let failed = count("failed", input.failed)?;
        let not_run = count("not_run", input.not_run.unwrap_or(0))?;
        let executed = passed.saturating_add(failed).saturating_add(not_run);
        let total_tests = match input.total_tests {
            Some(total) => count("total_tests", total)?,
            None => executed,
        };

        if executed > total_tests {
            return Err(AppError::Validation(format!(
                "passed + failed + not_run ({executed}) exceeds total_tests ({total_tests})"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            executed_at: input.executed_at.unwrap_or(now),
            total_tests,
            passed,
            failed,
            not_run,
            critical_defects: count("critical_defects", input.critical_defects.unwrap_or(0))?,
            test_coverage_pct: input
                .test_coverage_pct
                .map(|value| validate_percentage("test_coverage_pct", value))
                .transpose()?,
            created_at: now,
        })
    }

    /// Passed share of all planned cases, in percent.
    #[must_use]
    pub fn pass_rate_pct(&self) -> f64 {
        percentage(f64::from(self.passed), f64::from(self.total_tests))
    }

    /// Not-run share of all planned cases, in percent.
    #[must_use]
    pub fn not_run_pct(&self) -> f64 {
        percentage(f64::from(self.not_run), f64::from(self.total_tests))
    }

    /// Metrics for gate evaluation.
    #[must_use]
    pub fn gate_metrics(&self) -> GateMetrics {
        GateMetrics {
            pass_rate_pct: self.pass_rate_pct(),
            critical_defects: self.critical_defects,
            test_coverage_pct: self.test_coverage_pct,
        }
    }

    /// Whole days elapsed since the run.
    #[must_use]
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.executed_at).num_days()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{GateCriterion, GateMetrics, QualityGate, QualityGateInput, TestRunInput, TestRunSummary};

    #[test]
    fn defaults_match_release_policy() {
        let gate = QualityGate::defaults(Uuid::new_v4());
        assert!(gate.is_default);
        assert_eq!(gate.min_pass_rate, 95.0);
        assert_eq!(gate.max_critical_defects, 0);
        assert_eq!(gate.min_test_coverage, 80.0);
    }

    #[test]
    fn gate_values_are_range_checked() {
        let base = QualityGateInput {
            project_id: Uuid::new_v4(),
            min_pass_rate: Some(101.0),
            max_critical_defects: None,
            min_test_coverage: None,
        };
        assert!(QualityGate::new(base.clone(), Utc::now()).is_err());

        let negative_defects = QualityGateInput {
            min_pass_rate: Some(90.0),
            max_critical_defects: Some(-1),
            ..base
        };
        assert!(QualityGate::new(negative_defects, Utc::now()).is_err());
    }

    #[test]
    fn evaluation_lists_failed_criteria() {
        let gate = QualityGate::defaults(Uuid::new_v4());
        let metrics = GateMetrics::new(90.0, 0, None).unwrap_or_else(|_| unreachable!());
        let evaluation = gate.evaluate(&metrics, Utc::now());

        assert!(!evaluation.passed);
        let failed: Vec<GateCriterion> = evaluation
            .criteria
            .iter()
            .filter(|criterion| !criterion.passed)
            .map(|criterion| criterion.criterion)
            .collect();
        assert_eq!(failed, vec![GateCriterion::PassRate, GateCriterion::TestCoverage]);
        assert_eq!(evaluation.blocking_issues().len(), 2);
    }

    #[test]
    fn evaluation_passes_at_thresholds() {
        let gate = QualityGate::defaults(Uuid::new_v4());
        let metrics = GateMetrics::new(95.0, 0, Some(80.0)).unwrap_or_else(|_| unreachable!());
        assert!(gate.evaluate(&metrics, Utc::now()).passed);
    }

    #[test]
    fn run_summary_rates() {
        let run = TestRunSummary::new(
            TestRunInput {
                project_id: Uuid::new_v4(),
                executed_at: None,
                total_tests: Some(200),
                passed: 150,
                failed: 10,
                not_run: Some(40),
                critical_defects: None,
                test_coverage_pct: Some(82.5),
            },
            Utc::now(),
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(run.pass_rate_pct(), 75.0);
        assert_eq!(run.not_run_pct(), 20.0);
    }

    #[test]
    fn run_counts_cannot_exceed_total() {
        let result = TestRunSummary::new(
            TestRunInput {
                project_id: Uuid::new_v4(),
                executed_at: None,
                total_tests: Some(10),
                passed: 9,
                failed: 2,
                not_run: None,
                critical_defects: None,
                test_coverage_pct: None,
            },
            Utc::now(),
        );
        assert!(result.is_err());
    }
}
