use crate::error::{ContractResult, ensure};
use crate::fixtures::ProbeContext;
use crate::options::ProbeGroup;
use crate::runner::Runner;

const UNAUTHENTICATED_READS: [&str; 7] = [
    "/dashboard",
    "/projects",
    "/resources",
    "/tasks",
    "/governance/release-readiness",
    "/reports",
    "/audit-logs",
];

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(
            ProbeGroup::Auth,
            "endpoints answer without credentials",
            endpoints_need_no_credentials,
        )
        .await;
}

async fn endpoints_need_no_credentials(context: &mut ProbeContext) -> ContractResult<()> {
    for path in UNAUTHENTICATED_READS {
        let response = context.client.get(path).await?;
        ensure(!matches!(response.status, 401 | 403), || {
            format!("{} demanded credentials with {}", response.path, response.status)
        })?;
        ensure(response.status < 500, || {
            format!("{} failed with {}", response.path, response.status)
        })?;
    }

    Ok(())
}
