//!
//! murmur development backend binary
//! ---------------------------------
//! Serves the in-memory REST backend the client talks to. Flags override
//! `MURMUR_*` environment variables, which override the defaults.

use std::env;

use anyhow::Result;
use tracing::info;

use murmur::config::ServerConfig;

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return args[i + 1].parse::<u16>().ok();
        }
        i += 1;
    }
    None
}

fn parse_string_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool { args.iter().any(|a| a == flag) }

#[tokio::main]
async fn main() -> Result<()> {
    murmur::logging::init("info");

    let args: Vec<String> = env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("murmur development backend\n\nUSAGE:\n  murmur_server [--port N] [--bind ADDR] [--seed-demo]\n\nOPTIONS:\n  --port N        HTTP port (env: MURMUR_HTTP_PORT, default 5000)\n  --bind ADDR     Bind address (env: MURMUR_BIND, default 127.0.0.1)\n  --seed-demo     Create a demo account and posts (env: MURMUR_SEED_DEMO)\n");
        return Ok(());
    }

    let mut cfg = ServerConfig::from_env();
    if let Some(p) = parse_port_arg(&args, "--port") {
        cfg.port = p;
    }
    if let Some(b) = parse_string_arg(&args, "--bind") {
        cfg.bind = b;
    }
    if has_flag(&args, "--seed-demo") {
        cfg.seed_demo = true;
    }

    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "murmur",
        "murmur_server starting: RUST_LOG='{}', bind={}, port={}, seed_demo={}",
        rust_log, cfg.bind, cfg.port, cfg.seed_demo
    );
    murmur::server::run_with_config(&cfg).await
}
