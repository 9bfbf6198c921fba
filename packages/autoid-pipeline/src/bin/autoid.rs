//! Rewrite a single query through the identifier pipeline and print the
//! arguments that would be forwarded to the database.
//!
//! ```text
//! autoid --schema schema.json --model User --operation create --args args.json
//! echo '{"data":{"name":"x"}}' | autoid --schema schema.json --model User --operation create
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use autoid_core::Operation;
use autoid_pipeline::{
    build_query_pipeline, init_tracing, AutoIdExtension, ExtensionConfig, LogFormat, QueryRequest,
};
use clap::Parser;
use serde_json::Value;
use tower::{service_fn, ServiceExt};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "autoid", about = "Fill generated UUIDv7 identifiers in a write query")]
struct Args {
    /// Schema description JSON (`{"datamodel":{"models":[...]}}` or a bare model list).
    #[arg(long, env = "AUTOID_SCHEMA")]
    schema: PathBuf,

    /// Model the query targets.
    #[arg(long)]
    model: String,

    /// Operation kind, e.g. `create`, `createMany`, `update`, `upsert`.
    #[arg(long)]
    operation: String,

    /// Query arguments as JSON. Reads stdin when omitted or `-`.
    #[arg(long, default_value = "-")]
    args: String,

    /// Log output format.
    #[arg(long, value_enum, env = "AUTOID_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Suppress the info log emitted for each generated identifier.
    #[arg(long, default_value_t = false)]
    quiet_generated: bool,
}

fn read_query_args(source: &str) -> anyhow::Result<Value> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read query arguments from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read query arguments from {source}"))?
    };
    serde_json::from_str(&text).context("query arguments are not valid JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format)?;

    let config = ExtensionConfig {
        log_generated: !args.quiet_generated,
        ..ExtensionConfig::from_path(&args.schema)
    };
    let extension = AutoIdExtension::new(&config)?;
    tracing::info!(
        schema = %args.schema.display(),
        models = extension.rewriter().index().len(),
        "extension ready"
    );

    let request = QueryRequest::new(
        args.model,
        Operation::from(args.operation.as_str()),
        read_query_args(&args.args)?,
    );

    // Stand-in executor: hands back the arguments it would have sent.
    let executor = service_fn(|request: QueryRequest| async move {
        Ok::<_, std::convert::Infallible>(request.args)
    });

    let forwarded = build_query_pipeline(&extension, executor)
        .oneshot(request)
        .await?;
    println!("{}", serde_json::to_string_pretty(&forwarded)?);
    Ok(())
}
