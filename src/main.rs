use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, filter::LevelFilter};
mod api;
use crate::api::{alerts::alerts_config, health::health_config};
mod cli;
mod config;
mod db;
mod jobs;
mod shutdown;
mod worker;
use crate::cli::{Cli, Command};
use crate::config::Credentials;
use crate::shutdown::ShutdownCoordinator;
use crate::worker::JobWorker;

/// Console output plus daily rotating files split by level
///
/// Log files are created as: logs/info.log.2024-12-22, logs/error.log.2024-12-22, etc.
fn init_tracing(log_dir: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .init();

    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Cli::parse();
    let command = args.command.unwrap_or(Command::Serve);

    // Probing the provider sends nothing, so Telegram settings are optional
    let credentials = match command {
        Command::Probe { .. } => Credentials::SearchOnly,
        Command::Serve | Command::RunOnce => Credentials::All,
    };

    // Missing credentials are fatal: refuse to start
    let config = match config::Config::from_env(credentials) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_dir)?;

    match command {
        Command::Serve => serve(config).await,
        Command::RunOnce => cli::run_once(config).await,
        Command::Probe { query, limit } => cli::probe(config, query, limit).await,
    }
}

async fn serve(config: config::Config) -> std::io::Result<()> {
    info!("Job Alert Bot initializing...");
    info!("Configuration loaded successfully:");
    info!("  - Schedule: {}", config.check_schedule);
    info!("  - Seen file: {}", config.seen_file.display());
    info!("  - Keywords: {}", config.keywords.len());
    info!("  - Notify delay: {:?}", config.notify_delay);

    let runner = cli::build_runner(&config)?;

    // An invalid schedule is fatal, like a missing credential
    let worker = JobWorker::new(runner.clone(), config.check_schedule.as_str());
    let scheduler = worker
        .start(config.run_on_startup)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to start scheduler: {}", e)))?;

    let server_runner = runner.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(server_runner.clone()))
            .configure(health_config)
            .configure(alerts_config)
    });

    info!("Server running at http://{}:{}", config.host, config.port);

    let server = server
        .bind((config.host.as_str(), config.port))?
        .run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let coordinator = ShutdownCoordinator::new(
        server_handle,
        server_task,
        scheduler,
        runner,
    );

    coordinator.wait_for_shutdown().await
}
