use std::path::PathBuf;

use clap::Args;
use tokio::io::AsyncWriteExt;

use gophernest_daemon::http_server::api::client::ApiError;
use gophernest_daemon::http_server::api::v1::DownloadRequest;

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Absolute paths on the server to include
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Where to write the zip archive
    #[arg(long, short, default_value = "downloads.zip")]
    pub output: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed writing {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = DownloadRequest {
            file_paths: self.paths.clone(),
        };
        let mut response = ctx.client.call_raw(request).await?;

        let write_err = |e| DownloadError::Write(self.output.clone(), e);
        let mut file = tokio::fs::File::create(&self.output)
            .await
            .map_err(write_err)?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(ApiError::from)? {
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;

        Ok(format!("wrote {} bytes to {}", written, self.output.display()))
    }
}
