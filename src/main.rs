use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use response_saver::config::{ConfigLoader, ManifestConfig, SaverConfig};
use response_saver::dispatcher::Dispatcher;
use response_saver::fetcher::Fetcher;
use response_saver::metrics::snapshot::MetricsSnapshot;
use response_saver::{source, Error};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "response-saver")]
#[command(version)]
#[command(about = "Fetch a list of URLs concurrently and save each response body to a file", long_about = None)]
struct Cli {
    /// File with one URL per line [default: urls.txt]
    #[arg(long)]
    src: Option<PathBuf>,

    /// Directory for saved responses, created if missing [default: responses]
    #[arg(long)]
    dst: Option<PathBuf>,

    /// Configuration file (JSON/YAML/TOML); flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum number of URLs fetched at once (unbounded by default)
    #[arg(long)]
    concurrency: Option<usize>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Write a run manifest (.json or .csv)
    #[arg(long)]
    manifest: Option<String>,

    /// Show a progress bar (stderr)
    #[arg(short, long)]
    progress: bool,
}

impl Cli {
    fn into_config(self) -> response_saver::Result<SaverConfig> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => SaverConfig::default(),
        };

        if let Some(src) = self.src {
            config.src = src;
        }
        if let Some(dst) = self.dst {
            config.dst = dst;
        }
        if self.timeout.is_some() {
            config.timeout_secs = self.timeout;
        }
        if self.concurrency.is_some() {
            config.concurrency = self.concurrency;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        if let Some(path) = self.manifest {
            let manifest = ManifestConfig::from_path(&path).ok_or_else(|| {
                Error::Config(format!("Unsupported manifest extension: {}", path))
            })?;
            config.manifest = Some(manifest);
        }

        ConfigLoader::validate(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let start = Instant::now();

    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    let cli = Cli::parse();
    let progress = cli.progress;
    let logger = env_logger::Builder::from_default_env().build();
    let multi = indicatif::MultiProgress::new();

    if progress {
        indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
            .try_init()
            .context("installing logger")?;
    } else {
        let level = logger.filter();
        log::set_boxed_logger(Box::new(logger)).context("installing logger")?;
        log::set_max_level(level);
    }

    let config = cli.into_config()?;
    log::debug!("Using config: {:?}", config);

    tokio::fs::create_dir_all(&config.dst)
        .await
        .map_err(|source| Error::DirectoryCreation {
            path: config.dst.clone(),
            source,
        })?;

    let urls = source::load_urls(&config.src).await?;
    log::info!("Loaded {} urls from {}", urls.len(), config.src.display());

    let fetcher = Fetcher::new(
        config.timeout_secs.map(Duration::from_secs),
        &config.user_agent,
    )?;
    let mut dispatcher = Dispatcher::new(fetcher, None).with_concurrency(config.concurrency);
    if let Some(output) = ConfigLoader::open_manifest(&config) {
        dispatcher = dispatcher.with_output(output);
    }

    let mut progress_bar: Option<ProgressBar> = None;
    let mut progress_task = None;
    if progress {
        let pb = multi.add(ProgressBar::new(urls.len() as u64));
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"));

        let mut metrics_rx = dispatcher.watch_metrics();
        let pb_clone = pb.clone();
        progress_bar = Some(pb);
        progress_task = Some(tokio::spawn(async move {
            while metrics_rx.changed().await.is_ok() {
                let snapshot: MetricsSnapshot = metrics_rx.borrow().clone();
                pb_clone.set_position(snapshot.urls_processed);
                pb_clone.set_message(format!(
                    "Saved: {} | Failed: {} | Active: {}",
                    snapshot.files_written,
                    snapshot.failures(),
                    snapshot.active_tasks
                ));
            }
        }));
    }

    let report = dispatcher.run_since(start, urls, &config.dst).await;

    if let Some(task) = progress_task {
        task.abort();
    }
    if let Some(pb) = progress_bar {
        let final_metrics = dispatcher.get_metrics();
        pb.set_position(final_metrics.urls_processed);
        pb.finish_with_message(format!(
            "Saved: {} | Failed: {} - Completed",
            final_metrics.files_written,
            final_metrics.failures()
        ));
    }

    let final_metrics = dispatcher.get_metrics();
    println!();
    println!("Saved: {}", report.saved.len());
    println!("Failed: {}", report.failures.len());
    println!("Hosts: {}", report.hosts.len());
    println!("Bytes written: {}", final_metrics.bytes_written);
    println!("Elapsed time: {:.2} seconds", report.elapsed.as_secs_f64());

    Ok(())
}
