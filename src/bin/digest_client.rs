//! Command-line caller for the digest service: collects 1–3 topics and a
//! source mode, prints the narrated summary or the error detail.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use news_digest::client::{ClientError, DigestClient};
use news_digest::SourceMode;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    Both,
    News,
    Discussion,
}

impl From<Source> for SourceMode {
    fn from(s: Source) -> Self {
        match s {
            Source::Both => SourceMode::Both,
            Source::News => SourceMode::News,
            Source::Discussion => SourceMode::Discussion,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "digest-client", about = "Get a narrated digest of the latest news and discussion")]
struct Cli {
    /// Topic to cover (repeat up to 3 times), e.g. -t AI -t Bitcoin
    #[arg(short, long = "topic", required = true)]
    topics: Vec<String>,

    /// Which sources to use
    #[arg(short, long, value_enum, default_value_t = Source::Both)]
    source: Source,

    /// Service base URL
    #[arg(long, env = "DIGEST_BACKEND_URL", default_value = "http://127.0.0.1:8000")]
    url: String,

    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    let client = DigestClient::new(&cli.url, Duration::from_secs(cli.timeout_secs))?;
    match client.generate(&cli.topics, cli.source.into()).await {
        Ok(summary) => {
            println!("{summary}");
            Ok(ExitCode::SUCCESS)
        }
        Err(ClientError::Connectivity(_)) => {
            eprintln!("Could not connect to the backend server at {}.", cli.url);
            Ok(ExitCode::from(2))
        }
        Err(ClientError::Timeout(_)) => {
            eprintln!(
                "The backend server at {} did not answer within {}s; try a larger --timeout-secs.",
                cli.url, cli.timeout_secs
            );
            Ok(ExitCode::from(3))
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
