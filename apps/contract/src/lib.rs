//! Contract suite for the Gerbil governance API.
//!
//! Replays the API contract as sequential probes against any deployment: each
//! case creates its own fixtures, checks one behaviour and deletes what it
//! created. [`run_suite`] drives the selected [`ProbeGroup`]s and returns a
//! [`SuiteReport`] that [`render`] prints as text or JSON.

#![forbid(unsafe_code)]

mod client;
mod error;
mod fixtures;
mod options;
mod output;
mod payload;
mod probes;
mod runner;

pub use client::{ACTOR_HEADER, ContractClient, ProbeResponse, SUITE_ACTOR};
pub use error::{ContractError, ContractResult};
pub use fixtures::{FixtureKind, FixtureLedger, ProbeContext};
pub use options::{OutputFormat, ProbeGroup, SuiteOptions};
pub use output::render;
pub use runner::{CaseOutcome, CaseStatus, Runner, SuiteReport, run_suite};

use tracing_subscriber::EnvFilter;

/// Installs the compact stderr subscriber used by the CLI.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
