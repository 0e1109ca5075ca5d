use crate::error::{ContractError, ContractResult, ensure};
use crate::fixtures::ProbeContext;
use crate::options::ProbeGroup;
use crate::runner::Runner;

/// Frontend routes the web app must serve.
const PAGES: [&str; 6] = ["/", "/projects", "/tasks", "/resources", "/governance", "/reports"];

/// Marker every rendered page shell contains.
const PAGE_MARKER: &str = "<html";

pub(crate) async fn run(runner: &mut Runner) {
    for page in PAGES {
        let name = format!("page {page} renders");
        runner
            .case(ProbeGroup::Ui, name.as_str(), async |context: &mut ProbeContext| {
                page_renders(context, page).await
            })
            .await;
    }
}

async fn page_renders(context: &ProbeContext, page: &str) -> ContractResult<()> {
    let Some(frontend_url) = context.options.frontend_url.as_deref() else {
        return Err(ContractError::Setup("no frontend url configured".to_owned()));
    };

    let url = format!("{}{page}", frontend_url.trim_end_matches('/'));
    let response = context.client.get_absolute(url.as_str()).await?;
    response.expect_status(&[200])?;
    let html = response.text().to_ascii_lowercase();
    ensure(html.contains(PAGE_MARKER), || {
        format!("{url} did not return an HTML page")
    })
}
