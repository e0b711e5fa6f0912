mod args;
mod config;
mod report;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use app_api::{AppContext, UptimeRequest, expand_home_path};
use http_api::HttpState;
use uptime_app::{AppConfig, AppState, ensure_app_data_dir};

use crate::args::{Cli, Command, ServeArgs};
use crate::config::ConfigLoad;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let loaded = config::load_or_create()?;
    if loaded.created {
        eprintln!("Created config at {}.", loaded.paths.file.display());
    }
    let context = AppContext::new(AppState::new(app_config(&loaded)));

    match cli.command {
        Some(Command::Serve(ref serve_args)) => {
            let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
            runtime.block_on(serve(context, &loaded, serve_args))?;
            Ok(ExitCode::SUCCESS)
        }
        None => run_report(&context, &cli),
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn app_config(loaded: &ConfigLoad) -> AppConfig {
    let data_dir = loaded
        .config
        .data_dir
        .as_deref()
        .map(expand_home_path)
        .unwrap_or_else(|| loaded.paths.default_data_dir.clone());
    AppConfig::new(
        expand_home_path(&loaded.config.sessions_dir),
        loaded.config.include_local,
        data_dir,
    )
}

fn run_report(context: &AppContext, cli: &Cli) -> Result<ExitCode> {
    let req = UptimeRequest {
        window: Some(cli.window.clone()),
        start: cli.start.clone(),
        end: cli.end.clone(),
        granularity: cli.granularity.clone(),
    };
    let result = if cli.roots.is_empty() {
        app_api::uptime(context, req)
    } else {
        app_api::uptime_for_roots(context, &cli.roots, req)
    };
    let report = match result {
        Ok(report) => report,
        Err(err) if err.is_configuration() => {
            println!("{err}");
            return Ok(ExitCode::from(2));
        }
        Err(err) => return Err(err.into()),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_text(&report));
    }
    Ok(ExitCode::SUCCESS)
}

async fn serve(context: AppContext, loaded: &ConfigLoad, args: &ServeArgs) -> Result<()> {
    ensure_app_data_dir(&context.app_state.config)?;
    let host = args.host.clone().unwrap_or_else(|| loaded.config.host.clone());
    let port = args.port.unwrap_or(loaded.config.port);
    let (listener, actual_port) =
        bind_with_retry(&host, port, loaded.config.port_retry_count).await?;

    let router = http_api::router(HttpState::new(context));
    println!("Serving on http://{host}:{actual_port}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

/// Binds `port`, then `port + 1`, ... for up to `attempts` tries.
async fn bind_with_retry(host: &str, port: u16, attempts: u16) -> Result<(TcpListener, u16)> {
    if attempts == 0 {
        bail!("port_retry_count must be at least 1");
    }
    let mut last_port = port;
    for offset in 0..attempts {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        last_port = candidate;
        match TcpListener::bind((host, candidate)).await {
            Ok(listener) => {
                if offset > 0 {
                    tracing::warn!(requested = port, port = candidate, "requested port busy, using fallback");
                }
                return Ok((listener, candidate));
            }
            Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
                tracing::warn!(port = candidate, "port already in use, trying next");
            }
            Err(err) => {
                return Err(err).with_context(|| format!("bind {host}:{candidate}"));
            }
        }
    }
    Err(anyhow!(
        "could not bind to ports {port}-{last_port}: address already in use"
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
