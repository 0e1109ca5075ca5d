use tokio::process::Command;

use crate::error::{ContractError, ContractResult};
use crate::fixtures::ProbeContext;
use crate::options::ProbeGroup;
use crate::runner::Runner;

/// Commands a deployment host must be able to run.
const COMMANDS: [&[&str]; 7] = [
    &["docker", "compose", "config"],
    &["docker", "compose", "version"],
    &["docker", "--version"],
    &["ssh", "-V"],
    &["git", "--version"],
    &["node", "--version"],
    &["npm", "--version"],
];

pub(crate) async fn run(runner: &mut Runner) {
    for command in COMMANDS {
        let name = format!("`{}` exits cleanly", command.join(" "));
        runner
            .case(ProbeGroup::Toolchain, name.as_str(), async |_: &mut ProbeContext| {
                command_succeeds(command).await
            })
            .await;
    }
}

async fn command_succeeds(command: &'static [&'static str]) -> ContractResult<()> {
    let Some((program, args)) = command.split_first() else {
        return Err(ContractError::Setup("empty command".to_owned()));
    };

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|error| ContractError::assertion(format!("could not run {program}: {error}")))?;

    if output.status.success() {
        return Ok(());
    }

    Err(ContractError::assertion(format!(
        "`{}` exited with {}: {}",
        command.join(" "),
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    )))
}
