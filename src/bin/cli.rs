//! Command line front end: scrape one post or profile and print the JSON result envelope

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use threads_scraper::scraper::DEFAULT_TIMEOUT;
use threads_scraper::{
    BrowserSource, ConnectionOptions, LaunchOptions, ScrapeRequest, ScrapeResult, Scraper, ScraperConfig,
};

#[derive(Parser)]
#[command(name = "threads-scraper")]
#[command(version)]
#[command(about = "Scrape public Threads posts and profiles", long_about = None)]
struct Cli {
    #[command(flatten)]
    browser: BrowserArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BrowserArgs {
    /// Navigation timeout in milliseconds (at most 60000)
    #[arg(long, global = true, env = "SCRAPER_TIMEOUT", value_name = "MS")]
    timeout: Option<u64>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H', global = true)]
    headed: bool,

    /// Run headless; `--headed` wins when both are given
    #[arg(long, global = true, env = "SCRAPER_HEADLESS", default_value_t = true, action = clap::ArgAction::Set)]
    headless: bool,

    /// Path to custom browser executable
    #[arg(long, global = true, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// Attach to a running browser through its DevTools websocket instead of launching one
    #[arg(long, global = true, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Keep error details in the output
    #[arg(long, global = true)]
    details: bool,

    /// Print compact JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape a post and its replies
    Post {
        /// Post URL, e.g. https://www.threads.net/@user/post/ABC123
        url: String,

        /// Return the post without its replies
        #[arg(long)]
        no_replies: bool,

        /// Keep at most N replies
        #[arg(long, value_name = "N")]
        max_replies: Option<u64>,
    },
    /// Scrape the most recent posts of a profile
    Profile {
        /// Profile URL, e.g. https://www.threads.net/@user
        url: String,

        /// Keep at most N posts
        #[arg(long, short = 'n', value_name = "N")]
        count: Option<u64>,
    },
    /// Run a JSON request body (`-` reads stdin)
    Request {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl BrowserArgs {
    fn source(&self) -> BrowserSource {
        if let Some(ref endpoint) = self.ws_endpoint {
            return ConnectionOptions::new(endpoint.clone()).into();
        }

        let mut options = LaunchOptions::new().headless(self.headless && !self.headed);
        if let Some(ref path) = self.chrome_path {
            options = options.chrome_path(path.clone());
        }
        options.into()
    }
}

fn read_request(file: &Path) -> anyhow::Result<ScrapeRequest> {
    let mut body = String::new();
    if file.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut body).context("Failed to read request from stdin")?;
    } else {
        body = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    }

    let value: Value = serde_json::from_str(&body).context("Request body is not valid JSON")?;
    Ok(ScrapeRequest::from_json(value)?)
}

fn build_request(command: &Command, timeout: Option<u64>) -> anyhow::Result<ScrapeRequest> {
    let mut request = match command {
        Command::Post { url, no_replies, max_replies } => ScrapeRequest {
            include_replies: Some(!no_replies),
            max_replies: *max_replies,
            ..ScrapeRequest::post(url.clone())
        },
        Command::Profile { url, count } => ScrapeRequest { post_count: *count, ..ScrapeRequest::profile(url.clone()) },
        Command::Request { file } => read_request(file)?,
    };

    if request.timeout.is_none() {
        request.timeout = timeout;
    }
    Ok(request)
}

fn run(cli: Cli) -> anyhow::Result<ScrapeResult> {
    let request = build_request(&cli.command, cli.browser.timeout)?;
    log::debug!("Running {:?}", request);

    let timeout = cli.browser.timeout.map(Duration::from_millis).unwrap_or(DEFAULT_TIMEOUT);
    let config = ScraperConfig::new().timeout(timeout);
    let result = Scraper::new(cli.browser.source()).with_config(config).execute(&request);

    Ok(if cli.browser.details { result } else { result.redacted() })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let compact = cli.browser.compact;

    let result = match run(cli) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let rendered = if compact { serde_json::to_string(&result) } else { serde_json::to_string_pretty(&result) };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to serialize result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
