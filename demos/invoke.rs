//! Invoke a built-in tool from the command line.
//!
//! Usage:
//!   cargo run --example invoke -- nanobio_toxicity_estimator '{"size_nm": 30, "charge_mV": 10, "material": "polymer"}'
//!   cargo run --example invoke -- UniProt_search '{"query": "insulin", "organism": "human", "limit": 3}' --stream
//!   cargo run --example invoke -- nanobio_toxicity_estimator '{...}' --cache --repeat 3
//!   cargo run --example invoke -- --list

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tool_dispatch::{
    init_shared_client, run_shared, CallOptions, ClientConfig, ToolClient, ToolRequest,
};

#[derive(Parser)]
#[command(name = "invoke", about = "Run a registered tool once or several times")]
struct Cli {
    /// Tool name
    tool: Option<String>,

    /// Arguments as a JSON object
    #[arg(default_value = "{}")]
    args: String,

    /// Consult and populate the result cache
    #[arg(long)]
    cache: bool,

    /// Skip argument validation
    #[arg(long)]
    no_validate: bool,

    /// Print chunks as the tool emits them
    #[arg(long)]
    stream: bool,

    /// JSON config file
    #[arg(long)]
    config: Option<String>,

    /// Number of times to run the same request
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    /// List registered tools and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match ClientConfig::load(path).await {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ClientConfig::default(),
    }
    .with_env_overrides();

    let client = match ToolClient::from_config(&config).map(init_shared_client) {
        Ok(Ok(c)) => c,
        Ok(Err(_)) => {
            eprintln!("error: shared client already installed");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.list {
        for schema in client.registry().schemas() {
            println!("{}", serde_json::to_string_pretty(&schema).unwrap_or_default());
        }
        return ExitCode::SUCCESS;
    }

    let Some(tool) = cli.tool.clone() else {
        eprintln!("error: a tool name is required (or pass --list)");
        return ExitCode::FAILURE;
    };

    let arguments = match serde_json::from_str(&cli.args) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => {
            eprintln!("error: arguments must be a JSON object");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("error: invalid JSON arguments: {e}");
            return ExitCode::FAILURE;
        }
    };
    let request = ToolRequest {
        name: tool,
        arguments,
    };

    for _ in 0..cli.repeat.max(1) {
        let mut print_chunk = |chunk: &str| {
            print!("{chunk}");
            let _ = io::stdout().flush();
        };

        let mut options = CallOptions::new();
        if cli.cache {
            options = options.cached();
        }
        if cli.no_validate {
            options = options.without_validation();
        }
        if cli.stream {
            options = options.streaming(&mut print_chunk);
        }

        match run_shared(&request, options).await {
            Ok(value) => {
                if cli.stream {
                    println!();
                }
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).unwrap_or_default()
                );
            }
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.cache {
        let stats = client.cache_stats();
        eprintln!(
            "cache: {} hits, {} misses, {} stores",
            stats.hits, stats.misses, stats.stores
        );
    }

    ExitCode::SUCCESS
}
