// src/main.rs

use anyhow::{Context, Result};
use chunkget::config::DEFAULT_CONFIG_PATH;
use chunkget::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

/// Download files over HTTP, resuming where a previous run stopped.
#[derive(Debug, Parser)]
#[command(name = "chunkget", version)]
struct Args {
    /// URLs to download. Without any, urls are read interactively.
    urls: Vec<String>,

    /// Route downloads through the proxy from the config file.
    #[arg(long)]
    use_proxy: bool,

    /// Use the `http` proxy entry.
    #[arg(long, visible_alias = "http")]
    use_http: bool,

    /// Use the `https` proxy entry (the default).
    #[arg(long, visible_alias = "https")]
    use_https: bool,

    /// Proxy config file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Bytes per ranged request.
    #[arg(long, default_value_t = chunkget::models::DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,

    /// Directory to save files in.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// More output; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

enum Failure {
    Config(anyhow::Error),
    Download(anyhow::Error),
    TooManyInvalidAttempts,
}

impl Failure {
    fn exit_code(&self) -> ExitCode {
        match self {
            Failure::Config(_) => ExitCode::from(1),
            Failure::Download(_) => ExitCode::from(2),
            Failure::TooManyInvalidAttempts => ExitCode::from(3),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn transport_config(args: &Args) -> Result<TransportConfig> {
    let mut config = TransportConfig::default();
    if args.use_proxy {
        let proxies = ProxyConfig::load(&args.config)?;
        let scheme = ProxyScheme::from_flags(args.use_http, args.use_https);
        config = config.with_proxy(proxies.select(scheme)?);
    }
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

async fn fetch_one(client: &TransferClient, args: &Args, url: &str) -> Result<()> {
    let target = DownloadTarget::from_url(url, args.output_dir.as_deref());
    let options = DownloadOptions {
        chunk_size: args.chunk_size,
    };
    let destination = target.destination.clone();
    let report = download(client, target, options)
        .await
        .with_context(|| format!("downloading {} to {}", url, destination.display()))?;
    info!(?report, "saved {}", destination.display());
    println!("{} -> {}", url, destination.display());
    Ok(())
}

async fn run(args: Args) -> Result<(), Failure> {
    let config = transport_config(&args).map_err(Failure::Config)?;
    let client = TransferClient::new(&config)
        .context("building http client")
        .map_err(Failure::Config)?;

    if !args.urls.is_empty() {
        for url in &args.urls {
            let url = chunkget::prompt::validate_url(url)
                .with_context(|| format!("invalid url: {}", url))
                .map_err(Failure::Download)?;
            fetch_one(&client, &args, url.as_str()).await.map_err(Failure::Download)?;
        }
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut prompt = UrlPrompt::new(stdin.lock(), std::io::stdout());
    loop {
        let outcome = prompt
            .next_url()
            .context("reading url")
            .map_err(Failure::Download)?;
        match outcome {
            PromptOutcome::Url(url) => {
                fetch_one(&client, &args, url.as_str()).await.map_err(Failure::Download)?
            }
            PromptOutcome::TooManyInvalidAttempts => return Err(Failure::TooManyInvalidAttempts),
            PromptOutcome::EndOfInput => return Ok(()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            match &failure {
                Failure::Config(e) => error!("configuration error: {:#}", e),
                Failure::Download(e) => error!("error occurred while downloading: {:#}", e),
                Failure::TooManyInvalidAttempts => error!("too many invalid urls, giving up"),
            }
            failure.exit_code()
        }
    }
}
