use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use chainroute::connector::api::controller::RemoteController;
use chainroute::connector::api::request_tracing_enabled;
use chainroute::connector::http;
use chainroute::{route_remote, Commands, Container, ContainerConfig, HttpRouterClient, Router};

#[derive(Parser)]
#[command(name = "chainroute")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer with in-process echo backends instead of calling real models
    #[arg(long, global = true)]
    mock: bool,

    /// Per-backend timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[arg(long, global = true)]
    system_prompt: Option<String>,

    /// Do not register the hosted (OpenAI) backend
    #[arg(long, global = true)]
    no_hosted: bool,

    /// Do not register the local (Ollama) backend
    #[arg(long, global = true)]
    no_local: bool,

    #[arg(long, global = true)]
    openai_model: Option<String>,

    #[arg(long, global = true)]
    ollama_model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn container_config(&self) -> ContainerConfig {
        let mut config = ContainerConfig::from_env();
        config.mock_backends = self.mock;
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(prompt) = &self.system_prompt {
            config.system_prompt = prompt.clone();
        }
        if self.no_hosted {
            config.hosted.enabled = false;
        }
        if self.no_local {
            config.local.enabled = false;
        }
        if let Some(model) = &self.openai_model {
            config.hosted.model = model.clone();
        }
        if let Some(model) = &self.ollama_model {
            config.local.model = model.clone();
        }
        config
    }
}

fn log_level<F>(verbose: bool, lookup: F) -> Level
where
    F: Fn(&str) -> Option<String>,
{
    if verbose || request_tracing_enabled(lookup) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Remote calls wait for the server's own per-backend timeout plus a margin.
fn remote_timeout(timeout_secs: u64) -> Duration {
    Duration::from_secs(timeout_secs.max(1).saturating_add(5))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose, |key| std::env::var(key).ok()))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // After the subscriber, so invalid settings are reported.
    let config = cli.container_config();

    if let Some(server) = cli.command.server().map(str::to_string) {
        let client = HttpRouterClient::new(server, remote_timeout(config.timeout_secs));
        let output = route_remote(&RemoteController::new(client), cli.command).await?;
        println!("{}", output);
        return Ok(());
    }

    let container = Container::new(config)?;

    if let Commands::Serve { port, public } = cli.command {
        let ip = if public {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        let addr = SocketAddr::new(ip, port);

        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C");
                signal_token.cancel();
            }
        });

        return http::serve(Arc::new(container), addr, shutdown).await;
    }

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn ask_defaults_to_all_targets() {
        let cli = Cli::try_parse_from(["chainroute", "ask", "What is the capital of France?"]).unwrap();
        match cli.command {
            Commands::Ask { target, server, .. } => {
                assert_eq!(target, "all");
                assert!(server.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "chainroute",
            "backends",
            "--mock",
            "--no-local",
            "--timeout-secs",
            "5",
            "--openai-model",
            "gpt-4o-mini",
        ])
        .unwrap();

        let config = cli.container_config();
        assert!(config.mock_backends);
        assert!(!config.local.enabled);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.hosted.model, "gpt-4o-mini");
    }

    #[test]
    fn log_level_follows_verbose_and_tracing_flags() {
        assert_eq!(log_level(false, |_| None), Level::INFO);
        assert_eq!(log_level(true, |_| None), Level::DEBUG);
        let tracing_on = |key: &str| (key == "LANGCHAIN_TRACING_V2").then(|| "true".to_string());
        assert_eq!(log_level(false, tracing_on), Level::DEBUG);
    }

    #[test]
    fn remote_timeout_saturates() {
        assert_eq!(remote_timeout(30), Duration::from_secs(35));
        assert_eq!(remote_timeout(0), Duration::from_secs(6));
        assert_eq!(remote_timeout(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn serve_defaults_to_port_8000() {
        let cli = Cli::try_parse_from(["chainroute", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: 8000, public: false }));
    }
}
