//! Stdio transport host.

use std::sync::Arc;

use anyhow::{Context, Result};
use prefect_mcp_api::PrefectClient;
use rmcp::ServiceExt;
use tracing::info;

use crate::server::core::PrefectMcpCore;

/// Serve the Prefect tools over stdin/stdout until the peer disconnects.
///
/// Stdout carries the protocol, so nothing else may write to it while the
/// server runs.
pub async fn serve_stdio(client: PrefectClient) -> Result<()> {
    let core = PrefectMcpCore::new(Arc::new(client));
    let service = core
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP stdio server")?;
    info!("MCP server ready on stdio");

    let reason = service.waiting().await.context("MCP stdio server task failed")?;
    info!(?reason, "MCP server stopped");
    Ok(())
}
