use std::path::PathBuf;

use clap::Parser;

use offcart_core::OutputFormat;

mod run;

#[derive(Debug, Parser)]
#[command(name = "offcart")]
#[command(about = "Collect normalized Open Food Facts product records from page content")]
struct Cli {
    /// File with one barcode or product URL per line.
    #[arg(long)]
    input: PathBuf,

    /// Output format: jsonl or csv.
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Delay between requests, in seconds.
    #[arg(long)]
    delay: Option<f64>,

    /// Per-request timeout, in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Additional attempts after a first failed request.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Identifying User-Agent header sent with every request.
    #[arg(long)]
    user_agent: Option<String>,

    /// Directory receiving the timestamped output file.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Env (and .env) supply the defaults; explicit flags win.
    let mut config = offcart_core::load_app_config_from_env()?;
    if let Some(format) = cli.format {
        config.output_format = format;
    }
    if let Some(delay) = cli.delay {
        config.request_delay_ms = (delay.max(0.0) * 1000.0).round() as u64;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(user_agent) = cli.user_agent {
        config.user_agent = user_agent;
    }
    if let Some(out_dir) = cli.out_dir {
        config.output_dir = out_dir;
    }

    run::execute(&config, &cli.input).await?;
    Ok(())
}
