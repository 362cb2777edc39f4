use clap::Args;

use gophernest_daemon::http_server::api::v1::HealthcheckRequest;
use gophernest_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {}

/// Probe one status endpoint and describe the outcome.
async fn probe(client: &reqwest::Client, url: &str) -> String {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => "OK".to_string(),
        Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
        Err(_) => "NOT REACHABLE".to_string(),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.config_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push(format!("  api_port:     {}", state.config.api_port));
                lines.push(format!("  root:         {}", state.config.root.display()));
                let root_status = if state.config.root.is_dir() {
                    "OK"
                } else {
                    "MISSING"
                };
                lines.push(format!("  root exists:  {}", root_status));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }
        let secret_status = match AppState::jwt_secret() {
            Some(_) => "set",
            None => "NOT SET",
        };
        lines.push(format!("  jwt secret:   {}", secret_status));

        // 2. Check daemon liveness and readiness
        let base = ctx.client.base_url().as_str().trim_end_matches('/');
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", base));
        lines.push(format!(
            "  livez:  {}",
            probe(client, &format!("{}/_status/livez", base)).await
        ));
        lines.push(format!(
            "  readyz: {}",
            probe(client, &format!("{}/_status/readyz", base)).await
        ));

        // 3. Authenticated healthcheck
        match ctx.client.call(HealthcheckRequest).await {
            Ok(report) => {
                lines.push(format!("  api:    {}", report.health));
                for error in report.errors {
                    lines.push(format!("    - {}", error));
                }
            }
            Err(e) => lines.push(format!("  api:    {}", e)),
        }

        Ok(lines.join("\n"))
    }
}
