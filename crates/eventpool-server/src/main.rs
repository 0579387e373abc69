use anyhow::Result;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventpool::{Dispatcher, DispatcherConfig};

mod server;
use server::utils::{self, port_in_range};
use server::{init_router, RouterArgs, ServerState};

#[derive(Debug, Parser)]
#[command(version, about = "Accepts events over HTTP and processes them on a fixed worker pool")]
pub struct App {
    #[clap(flatten)]
    pub router_args: RouterArgs,

    #[clap(flatten)]
    pub dispatcher: DispatcherConfig,

    /// JSON file with dispatcher settings; replaces the dispatcher flags.
    #[clap(long, env = "EVENTPOOL_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(value_parser = port_in_range)]
    #[clap(short, long, env = "EVENTPOOL_PORT", default_value = "8080")]
    pub port: u16,

    #[clap(long, env = "EVENTPOOL_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// How long to wait for the workers to drain the queue on shutdown.
    #[clap(long, env = "EVENTPOOL_SHUTDOWN_TIMEOUT_SECS", default_value = "30")]
    pub shutdown_timeout_secs: u64,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<ExitCode> {
    let args = App::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                eprintln!("No environment variables found that can initialize tracing_subscriber::EnvFilter. Using defaults.");

                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                "eventpool=debug,eventpool_server=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => utils::load_config(path)?,
        None => {
            args.dispatcher.validate()?;
            args.dispatcher.clone()
        }
    };

    // Queue and workers are up before the first request can arrive
    let dispatcher = Dispatcher::with_simulated_work(&config)?;
    let router = init_router(&args.router_args, ServerState::new(dispatcher.ingestor()));

    let listener = TcpListener::bind((args.host, args.port)).await?;
    tracing::info!("Server is running on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await?;

    let drain = Duration::from_secs(args.shutdown_timeout_secs);
    match tokio::time::timeout(drain, dispatcher.shutdown()).await {
        Ok(Ok(report)) => {
            tracing::info!(
                "Stopped cleanly: {} tasks processed, {} failed",
                report.processed(),
                report.failed()
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(Err(err)) => Err(err.into()),
        Err(_) => {
            tracing::error!(
                "Workers did not drain the queue within {}s, exiting anyway",
                drain.as_secs()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventpool::Backpressure;

    #[test]
    fn test_cli_defaults() {
        let app = App::try_parse_from(["eventpool-server"]).unwrap();
        assert_eq!(app.port, 8080);
        assert_eq!(app.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(app.router_args.request_timeout_secs, 15);
        assert_eq!(app.dispatcher, DispatcherConfig::default());
        assert!(app.config.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let app = App::try_parse_from([
            "eventpool-server",
            "--port",
            "3000",
            "--workers",
            "8",
            "--capacity",
            "2",
            "--backpressure",
            "timeout",
            "--enqueue-timeout-millis",
            "500",
        ])
        .unwrap();
        assert_eq!(app.port, 3000);
        assert_eq!(app.dispatcher.workers, 8);
        assert_eq!(app.dispatcher.capacity, 2);
        assert_eq!(app.dispatcher.backpressure, Backpressure::Timeout);
        assert_eq!(app.dispatcher.enqueue_timeout_millis, Some(500));
        assert!(app.dispatcher.validate().is_ok());
    }

    #[test]
    fn test_cli_rejects_port_zero() {
        assert!(App::try_parse_from(["eventpool-server", "--port", "0"]).is_err());
    }
}
