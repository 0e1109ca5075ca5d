use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Serialize;

/// Probe groups, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProbeGroup {
    /// Liveness and dashboard rollups.
    Health,
    /// Project CRUD and validation.
    Projects,
    /// Resource CRUD and capacity bounds.
    Resources,
    /// Task CRUD and the status state machine.
    Tasks,
    /// Quality gates, approvals and readiness.
    Governance,
    /// Asynchronous report jobs.
    Reports,
    /// Audit trail snapshots.
    Audit,
    /// Absence of authentication.
    Auth,
    /// Frontend page checks.
    Ui,
    /// Deployment toolchain availability.
    Toolchain,
}

impl ProbeGroup {
    /// Every group in execution order.
    pub const ALL: [Self; 10] = [
        Self::Health,
        Self::Projects,
        Self::Resources,
        Self::Tasks,
        Self::Governance,
        Self::Reports,
        Self::Audit,
        Self::Auth,
        Self::Ui,
        Self::Toolchain,
    ];

    /// Stable group label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Projects => "projects",
            Self::Resources => "resources",
            Self::Tasks => "tasks",
            Self::Governance => "governance",
            Self::Reports => "reports",
            Self::Audit => "audit",
            Self::Auth => "auth",
            Self::Ui => "ui",
            Self::Toolchain => "toolchain",
        }
    }
}

impl fmt::Display for ProbeGroup {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per case plus a summary.
    Text,
    /// The whole report as a JSON document.
    Json,
}

/// Runs the Gerbil API contract suite against a live deployment.
#[derive(Debug, Clone, Parser)]
#[command(name = "gerbil-contract", version, about)]
pub struct SuiteOptions {
    /// API origin, without a path.
    #[arg(long, env = "CONTRACT_BASE_URL", default_value = "http://localhost:3001")]
    pub base_url: String,

    /// Host header sent with every API request, for virtual-hosted deployments.
    #[arg(long, env = "CONTRACT_HOST_HEADER")]
    pub host_header: Option<String>,

    /// Path prefix of the resource routes; an empty value probes the unprefixed routes.
    #[arg(long, env = "CONTRACT_API_PREFIX", default_value = "/api")]
    pub api_prefix: String,

    /// Per-request timeout.
    #[arg(long, env = "CONTRACT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// How long a report job is polled before the probe gives up on it.
    #[arg(long, env = "CONTRACT_REPORT_POLL_SECS", default_value_t = 30)]
    pub report_poll_secs: u64,

    /// Delay between report status polls.
    #[arg(long, env = "CONTRACT_REPORT_POLL_INTERVAL_MS", default_value_t = 2000)]
    pub report_poll_interval_ms: u64,

    /// Frontend origin; enables the UI page probes.
    #[arg(long, env = "CONTRACT_FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Enables the deployment toolchain probe.
    #[arg(long, env = "CONTRACT_DEPLOYMENT")]
    pub deployment: bool,

    /// Restricts the run to the given groups; repeatable.
    #[arg(long = "only", value_enum)]
    pub only: Vec<ProbeGroup>,

    /// Report rendering.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl SuiteOptions {
    /// Options with every default, pointed at `base_url`.
    #[must_use]
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            host_header: None,
            api_prefix: "/api".to_owned(),
            timeout_secs: 30,
            report_poll_secs: 30,
            report_poll_interval_ms: 2000,
            frontend_url: None,
            deployment: false,
            only: Vec::new(),
            format: OutputFormat::Text,
        }
    }

    /// Whether `group` was selected with `--only`, or no filter was given.
    #[must_use]
    pub fn selects(&self, group: ProbeGroup) -> bool {
        self.only.is_empty() || self.only.contains(&group)
    }

    /// Reason a selected group cannot run with these options.
    #[must_use]
    pub fn skip_reason(&self, group: ProbeGroup) -> Option<&'static str> {
        match group {
            ProbeGroup::Ui if self.frontend_url.is_none() => Some("no frontend url configured"),
            ProbeGroup::Toolchain if !self.deployment => Some("deployment checks not requested"),
            _ => None,
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Report polling window.
    #[must_use]
    pub fn report_poll_window(&self) -> Duration {
        Duration::from_secs(self.report_poll_secs)
    }

    /// Delay between report polls.
    #[must_use]
    pub fn report_poll_interval(&self) -> Duration {
        Duration::from_millis(self.report_poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{OutputFormat, ProbeGroup, SuiteOptions};

    #[test]
    fn flags_override_defaults() {
        let options = SuiteOptions::try_parse_from([
            "gerbil-contract",
            "--base-url",
            "http://72.61.157.168",
            "--host-header",
            "api.gerbil.qc",
            "--api-prefix",
            "",
            "--only",
            "projects",
            "--only",
            "tasks",
            "--format",
            "json",
        ]);
        assert!(options.is_ok());
        if let Ok(options) = options {
            assert_eq!(options.base_url, "http://72.61.157.168");
            assert_eq!(options.host_header.as_deref(), Some("api.gerbil.qc"));
            assert_eq!(options.api_prefix, "");
            assert_eq!(options.format, OutputFormat::Json);
            assert!(options.selects(ProbeGroup::Tasks));
            assert!(!options.selects(ProbeGroup::Reports));
        }
    }

    #[test]
    fn optional_groups_need_their_switches() {
        let mut options = SuiteOptions::for_base_url("http://localhost:3001");
        assert!(options.selects(ProbeGroup::Ui));
        assert!(options.skip_reason(ProbeGroup::Ui).is_some());
        assert!(options.skip_reason(ProbeGroup::Toolchain).is_some());
        assert!(options.skip_reason(ProbeGroup::Projects).is_none());

        options.frontend_url = Some("http://localhost:3000".to_owned());
        options.deployment = true;
        assert!(options.skip_reason(ProbeGroup::Ui).is_none());
        assert!(options.skip_reason(ProbeGroup::Toolchain).is_none());
    }
}
