use clap::Args;

use gophernest_daemon::http_server::api::client::ApiError;
use gophernest_daemon::http_server::api::v1::ChildrenRequest;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    #[command(flatten)]
    pub request: ChildrenRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let entries = ctx.client.call(self.request.clone()).await?;

        if entries.is_empty() {
            return Ok("(empty)".to_string());
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|entry| {
                let kind = if entry.directory { "dir " } else { "file" };
                format!("{}  {}", kind, entry.path.display())
            })
            .collect();
        Ok(lines.join("\n"))
    }
}
