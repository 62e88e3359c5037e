//! Formcraft CLI and REST API entry point.
//!
//! Binary name: `formcraft`
//!
//! Parses CLI arguments, loads configuration, initializes tracing, database
//! and services, then dispatches to the appropriate command handler or
//! starts the REST API server.

mod cli;
mod http;
mod state;

use std::net::SocketAddr;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, FormCommand, UserCommand};
use formcraft_infra::config::{load_config, resolve_data_dir};
use formcraft_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "formcraft", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    let config = load_config(&data_dir).await;

    init_tracing(&TracingOptions {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        json: config.logging.json,
        otel: config.logging.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match AppState::init(data_dir, config).await {
        Ok(state) => run(cli, state).await,
        Err(e) => Err(e),
    };
    shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            serve(state, &host, port, cli.quiet).await?;
        }

        Commands::User { action } => match action {
            UserCommand::Add {
                external_id,
                email,
                name,
                key_name,
            } => {
                cli::user::add_user(&state, external_id, email, name, &key_name, cli.json).await?;
            }
            UserCommand::List => {
                cli::user::list_users(&state, cli.json).await?;
            }
        },

        Commands::Form { action } => match action {
            FormCommand::List { owner } => {
                cli::form::list_forms(&state, &owner, cli.json).await?;
            }
            FormCommand::Generate { prompt, heuristic } => {
                cli::form::generate_form(&state, &prompt, heuristic, cli.json, cli.quiet).await?;
            }
            FormCommand::Export {
                form_id,
                owner,
                out,
            } => {
                cli::form::export_responses(&state, &form_id, &owner, out, cli.json).await?;
            }
        },

        Commands::Completions { .. } => {}
    }

    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, data_dir = %state.data_dir.display(), "api server listening");

    if !quiet {
        println!(
            "  {} Formcraft API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
