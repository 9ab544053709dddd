use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use gridbase_client::HttpRecordStore;
use gridbase_core::{RecordStore, ServiceConfig};
use gridbase_mcp::{McpServer, ToolProfile};

#[derive(Parser, Debug)]
#[command(name = "gridbase", version, about = "MCP server for the Gridbase record store")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server.
    Serve {
        /// Transport to serve on.
        #[arg(long, value_enum, default_value_t = TransportArg::Stdio)]
        transport: TransportArg,

        /// Port for the HTTP transport.
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Which tool surface to expose.
        #[arg(long, value_enum, default_value_t = ProfileArg::Full)]
        profile: ProfileArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TransportArg {
    Stdio,
    Http,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Minimal,
    Full,
}

impl From<ProfileArg> for ToolProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Minimal => ToolProfile::Minimal,
            ProfileArg::Full => ToolProfile::Full,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        // Stdout carries the protocol on the stdio transport.
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve {
            transport,
            port,
            profile,
        } => {
            let config = Arc::new(
                ServiceConfig::from_env().context("failed to load configuration")?,
            );
            tracing::info!(
                ?transport,
                ?profile,
                api_url = %config.api_url,
                "starting gridbase MCP server"
            );
            let store: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new(&config));
            let server = McpServer::new(store, config, profile.into());

            match transport {
                TransportArg::Stdio => server.run_stdio().await?,
                TransportArg::Http => server.run_http(port).await?,
            }
        }
    }

    Ok(())
}
