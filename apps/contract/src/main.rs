//! `gerbil-contract` command-line entry point.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use gerbil_contract::{ContractError, SuiteOptions, init_tracing, render, run_suite};

#[tokio::main]
async fn main() -> Result<ExitCode, ContractError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let options = SuiteOptions::parse();
    let format = options.format;
    let report = run_suite(options).await?;
    println!("{}", render(&report, format)?);

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
