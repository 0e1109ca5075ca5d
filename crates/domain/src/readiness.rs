use std::str::FromStr;

use chrono::{DateTime, Utc};
use gerbil_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{QualityGate, TestRunSummary};

/// Runs older than this many days are stale.
pub const STALE_AFTER_DAYS: i64 = 14;
/// Pass rate below this percentage is flagged.
pub const LOW_PASS_RATE_PCT: f64 = 80.0;
/// Not-run share above this percentage is flagged.
pub const HIGH_NOT_RUN_PCT: f64 = 20.0;
/// More failed cases than this are flagged.
pub const HIGH_FAILURE_COUNT: u32 = 10;
/// A pass-rate drop larger than this many points between runs is flagged.
pub const DECLINING_TREND_POINTS: f64 = 10.0;

/// Traffic-light release readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessStatus {
    /// Gate passes on fresh, complete results.
    Green,
    /// Gate passes but results are stale or incomplete.
    Amber,
    /// Gate fails.
    Red,
    /// No results recorded.
    Unknown,
}

impl ReadinessStatus {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Amber => "AMBER",
            Self::Red => "RED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for ReadinessStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GREEN" => Ok(Self::Green),
            "AMBER" => Ok(Self::Amber),
            "RED" => Ok(Self::Red),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(AppError::Validation(format!(
                "readiness status must be one of GREEN, AMBER, RED, UNKNOWN, got '{value}'"
            ))),
        }
    }
}

/// Readiness verdict with the reasons behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    /// Verdict.
    pub status: ReadinessStatus,
    /// Reasons blocking or degrading the release.
    pub blocking_issues: Vec<String>,
}

/// Assesses readiness from the gate and the latest run.
#[must_use]
pub fn assess_readiness(
    gate: &QualityGate,
    latest_run: Option<&TestRunSummary>,
    now: DateTime<Utc>,
) -> ReadinessAssessment {
    let Some(run) = latest_run else {
        return ReadinessAssessment {
            status: ReadinessStatus::Unknown,
            blocking_issues: vec!["no test results recorded".to_owned()],
        };
    };

    let evaluation = gate.evaluate(&run.gate_metrics(), now);
    if !evaluation.passed {
        return ReadinessAssessment {
            status: ReadinessStatus::Red,
            blocking_issues: evaluation.blocking_issues(),
        };
    }

    let mut warnings = Vec::new();
    let age_days = run.age_days(now);
    if age_days > STALE_AFTER_DAYS {
        warnings.push(format!("latest test run is {age_days} days old"));
    }
    if run.not_run_pct() > HIGH_NOT_RUN_PCT {
        warnings.push(format!("{:.1}% of tests were not run", run.not_run_pct()));
    }

    ReadinessAssessment {
        status: if warnings.is_empty() {
            ReadinessStatus::Green
        } else {
            ReadinessStatus::Amber
        },
        blocking_issues: warnings,
    }
}

/// Quality risk indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    /// Pass rate under 80%.
    LowPassRate,
    /// More than 20% not run.
    HighNotRun,
    /// Last run older than 14 days.
    StaleTests,
    /// More than 10 failures.
    HighFailureCount,
    /// Pass rate fell by more than 10 points.
    DecliningTrend,
    /// No runs at all.
    NoTests,
}

impl RiskFlag {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowPassRate => "LOW_PASS_RATE",
            Self::HighNotRun => "HIGH_NOT_RUN",
            Self::StaleTests => "STALE_TESTS",
            Self::HighFailureCount => "HIGH_FAILURE_COUNT",
            Self::DecliningTrend => "DECLINING_TREND",
            Self::NoTests => "NO_TESTS",
        }
    }
}

/// Detects risk flags from the two most recent runs.
#[must_use]
pub fn detect_risk_flags(
    latest_run: Option<&TestRunSummary>,
    previous_run: Option<&TestRunSummary>,
    now: DateTime<Utc>,
) -> Vec<RiskFlag> {
    let Some(run) = latest_run else {
        return vec![RiskFlag::NoTests];
    };

    let mut flags = Vec::new();
    if run.pass_rate_pct() < LOW_PASS_RATE_PCT {
        flags.push(RiskFlag::LowPassRate);
    }
    if run.not_run_pct() > HIGH_NOT_RUN_PCT {
        flags.push(RiskFlag::HighNotRun);
    }
    if run.age_days(now) > STALE_AFTER_DAYS {
        flags.push(RiskFlag::StaleTests);
    }
    if run.failed > HIGH_FAILURE_COUNT {
        flags.push(RiskFlag::HighFailureCount);
    }
    if let Some(previous) = previous_run {
        if previous.pass_rate_pct() - run.pass_rate_pct() > DECLINING_TREND_POINTS {
            flags.push(RiskFlag::DecliningTrend);
        }
    }

    flags
}

/// Aggregate risk severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// No flags.
    Normal,
    /// One flag.
    Warning,
    /// Two or more flags.
    Critical,
}

impl RiskLevel {
    /// Derives the level from the number of raised flags.
    #[must_use]
    pub fn from_flags(flags: &[RiskFlag]) -> Self {
        match flags.len() {
            0 => Self::Normal,
            1 => Self::Warning,
            _ => Self::Critical,
        }
    }
}

/// Overall project health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// Healthy.
    Green,
    /// Needs attention.
    Amber,
    /// Blocked.
    Red,
}

impl HealthStatus {
    /// Combines readiness and risk into one signal.
    #[must_use]
    pub fn combine(readiness: ReadinessStatus, risk: RiskLevel) -> Self {
        match (readiness, risk) {
            (ReadinessStatus::Red, _) | (_, RiskLevel::Critical) => Self::Red,
            (ReadinessStatus::Amber | ReadinessStatus::Unknown, _) | (_, RiskLevel::Warning) => {
                Self::Amber
            }
            (ReadinessStatus::Green, RiskLevel::Normal) => Self::Green,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::{
        HealthStatus, ReadinessStatus, RiskFlag, RiskLevel, assess_readiness, detect_risk_flags,
    };
    use crate::{QualityGate, TestRunInput, TestRunSummary};

    fn run(passed: i64, failed: i64, not_run: i64, days_ago: i64) -> TestRunSummary {
        let now = Utc::now();
        TestRunSummary::new(
            TestRunInput {
                project_id: Uuid::new_v4(),
                executed_at: Some(now - Duration::days(days_ago)),
                total_tests: None,
                passed,
                failed,
                not_run: Some(not_run),
                critical_defects: None,
                test_coverage_pct: Some(90.0),
            },
            now,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn readiness_follows_gate_and_freshness() {
        let gate = QualityGate::defaults(Uuid::new_v4());
        let now = Utc::now();

        assert_eq!(assess_readiness(&gate, None, now).status, ReadinessStatus::Unknown);
        assert_eq!(
            assess_readiness(&gate, Some(&run(99, 1, 0, 1)), now).status,
            ReadinessStatus::Green
        );
        assert_eq!(
            assess_readiness(&gate, Some(&run(99, 1, 0, 30)), now).status,
            ReadinessStatus::Amber
        );

        let red = assess_readiness(&gate, Some(&run(80, 20, 0, 1)), now);
        assert_eq!(red.status, ReadinessStatus::Red);
        assert_eq!(red.blocking_issues.len(), 1);
    }

    #[test]
    fn risk_flags_cover_each_rule() {
        let now = Utc::now();
        assert_eq!(detect_risk_flags(None, None, now), vec![RiskFlag::NoTests]);

        let bad = run(50, 20, 30, 20);
        let previous = run(90, 10, 0, 30);
        let flags = detect_risk_flags(Some(&bad), Some(&previous), now);
        assert_eq!(
            flags,
            vec![
                RiskFlag::LowPassRate,
                RiskFlag::HighNotRun,
                RiskFlag::StaleTests,
                RiskFlag::HighFailureCount,
                RiskFlag::DecliningTrend,
            ]
        );
        assert_eq!(RiskLevel::from_flags(&flags), RiskLevel::Critical);

        let healthy = run(100, 0, 0, 0);
        assert!(detect_risk_flags(Some(&healthy), None, now).is_empty());
    }

    #[test]
    fn health_takes_worst_signal() {
        assert_eq!(
            HealthStatus::combine(ReadinessStatus::Green, RiskLevel::Normal),
            HealthStatus::Green
        );
        assert_eq!(
            HealthStatus::combine(ReadinessStatus::Green, RiskLevel::Warning),
            HealthStatus::Amber
        );
        assert_eq!(
            HealthStatus::combine(ReadinessStatus::Unknown, RiskLevel::Normal),
            HealthStatus::Amber
        );
        assert_eq!(
            HealthStatus::combine(ReadinessStatus::Amber, RiskLevel::Critical),
            HealthStatus::Red
        );
    }
}
