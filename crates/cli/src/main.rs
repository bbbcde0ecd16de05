use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prefect_mcp_api::{ClientConfig, ConfigSources, PrefectClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// MCP server exposing a Prefect orchestration server as tools.
#[derive(Debug, Parser)]
#[command(name = "prefect-mcp", version, about)]
struct Cli {
    /// Prefect API base URL [env: PREFECT_API_URL, default: http://localhost:4200/api]
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Prefect API key, sent as a bearer token [env: PREFECT_API_KEY]
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// Request timeout in seconds [env: PREFECT_MCP_TIMEOUT_SECS, default: 30]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Log filter, for example `debug` or `prefect_mcp=trace` [env: RUST_LOG, default: info]
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve MCP over stdin/stdout (default)
    Serve,
    /// Call the Prefect health endpoint and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let sources = ConfigSources {
        api_url: cli.api_url,
        api_key: cli.api_key,
        timeout_secs: cli.timeout_secs.map(|secs| secs.to_string()),
    }
    .or(ConfigSources::from_env());
    let config = ClientConfig::from_sources(sources).context("invalid Prefect configuration")?;
    info!(api_url = %config.api_url(), "Prefect API URL");
    info!(
        "Using Prefect API key: {}",
        if config.has_api_key() { "yes" } else { "no" }
    );
    let client = PrefectClient::new(&config).context("failed to build Prefect API client")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => prefect_mcp::serve_stdio(client).await,
        Command::Check => run_check(&client).await,
    }
}

/// Logs go to stderr; stdout belongs to the MCP protocol.
fn init_tracing(log_level: Option<&str>) {
    let directives = log_level
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".into());
    let filter = build_filter(&directives).unwrap_or_else(|warning| {
        eprintln!("{warning}");
        EnvFilter::new("info")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn build_filter(directives: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(directives)
        .map_err(|error| format!("warning: invalid log filter '{directives}' ({error}); falling back to 'info'"))
}

async fn run_check(client: &PrefectClient) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("Prefect API at {} is not healthy", client.base_url()))?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse_before_and_after_subcommand() {
        let cli = Cli::parse_from(["prefect-mcp", "--api-url", "http://prefect:4200/api", "check", "--timeout-secs", "5"]);
        assert!(matches!(cli.command, Some(Command::Check)));
        assert_eq!(cli.api_url.as_deref(), Some("http://prefect:4200/api"));
        assert_eq!(cli.timeout_secs, Some(5));
    }

    #[test]
    fn invalid_log_filter_is_reported() {
        assert!(build_filter("prefect_mcp=debug,info").is_ok());
        let warning = build_filter("prefect_mcp=loud").unwrap_err();
        assert!(warning.contains("prefect_mcp=loud"), "{warning}");
        assert!(warning.contains("falling back to 'info'"));
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["prefect-mcp"]);
        assert!(cli.command.is_none());
    }
}
