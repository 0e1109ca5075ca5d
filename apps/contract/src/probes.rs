//! Probe groups. Each `run` executes its cases in order through the [`Runner`].
//!
//! [`Runner`]: crate::runner::Runner

pub(crate) mod audit;
pub(crate) mod auth;
pub(crate) mod governance;
pub(crate) mod health;
pub(crate) mod projects;
pub(crate) mod reports;
pub(crate) mod resources;
pub(crate) mod tasks;
pub(crate) mod toolchain;
pub(crate) mod ui;

use serde_json::Value;

use crate::client::ProbeResponse;
use crate::error::{ContractResult, ensure};
use crate::payload::has_error_payload;

/// Statuses a rejected write may use.
const REJECTION_STATUSES: [u16; 2] = [400, 422];

/// Fails unless the response is a 400/422 carrying an error payload.
fn expect_rejection(response: &ProbeResponse) -> ContractResult<Value> {
    response.expect_status(&REJECTION_STATUSES)?;
    let body = response.json()?;
    ensure(has_error_payload(&body), || {
        format!("{} rejected without an error payload: {body}", response.path)
    })?;
    Ok(body)
}
