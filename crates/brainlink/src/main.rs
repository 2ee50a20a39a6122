// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;

use brainlink::config::Config;
use brainlink::demo::CartPole;
use brainlink::schema::binder::Binder;

/// The wire protocol needs a simulator name (normally read from the
/// brain's uploaded Inkling source, which is outside this crate's scope);
/// this binary only ever drives the bundled reference simulator.
const DEMO_SIMULATOR_NAME: &str = "cartpole";

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(&config);

    let resolved = match config.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    let binder = Arc::new(Binder::new());
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    match brainlink::session::run(resolved, DEMO_SIMULATOR_NAME, Box::new(CartPole::new()), binder, cancel)
        .await
    {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Priority: `--log-level`/`BONSAI_LOG_LEVEL` > `RUST_LOG` > `"info"`.
fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("BONSAI_LOG_LEVEL").is_err() && config.log_level == "info" {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}
