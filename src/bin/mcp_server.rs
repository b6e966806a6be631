//! Threads scraper MCP Server
//!
//! This binary exposes the post and profile scrapers as Model Context Protocol tools,
//! over stdio or streamable HTTP.

use clap::{Parser, ValueEnum};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use rmcp::{ServiceExt, transport::stdio};
use std::time::Duration;
use threads_scraper::browser::{BrowserSource, ConnectionOptions, LaunchOptions};
use threads_scraper::mcp::ThreadsServer;
use threads_scraper::scraper::{DEFAULT_TIMEOUT, ScraperConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "mcp-server")]
#[command(version)]
#[command(about = "Threads scraper MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Run headless; `--headed` wins when both are given
    #[arg(long, env = "SCRAPER_HEADLESS", default_value_t = true, action = clap::ArgAction::Set)]
    headless: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<String>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<String>,

    /// Default navigation timeout in milliseconds
    #[arg(long, env = "SCRAPER_TIMEOUT", value_name = "MS", default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    timeout: u64,

    /// Include error details in tool results
    #[arg(long)]
    details: bool,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

impl Cli {
    fn browser_source(&self) -> BrowserSource {
        if let Some(ref endpoint) = self.ws_endpoint {
            return ConnectionOptions::new(endpoint.clone()).into();
        }

        let mut options = LaunchOptions::new().headless(self.headless && !self.headed);
        if let Some(ref path) = self.executable_path {
            options = options.chrome_path(path);
        }
        if let Some(ref dir) = self.user_data_dir {
            options = options.user_data_dir(dir);
        }
        options.into()
    }

    fn server(&self) -> ThreadsServer {
        ThreadsServer::with_source(self.browser_source())
            .with_config(ScraperConfig::new().timeout(Duration::from_millis(self.timeout)))
            .expose_details(self.details)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol, logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    log::info!("Threads scraper MCP Server v{}", env!("CARGO_PKG_VERSION"));
    match cli.browser_source() {
        BrowserSource::Launch(ref options) => {
            log::info!("Browser mode: {}", if options.headless { "headless" } else { "headed" });
            if let Some(ref path) = options.chrome_path {
                log::info!("Browser executable: {}", path.display());
            }
        }
        BrowserSource::Connect(ref options) => log::info!("WebSocket endpoint: {}", options.ws_url),
    }
    log::info!("Default timeout: {}ms", cli.timeout);

    // Route to appropriate transport
    match cli.transport {
        Transport::Stdio => {
            log::info!("Ready to accept MCP connections via stdio");
            let server = cli.server().serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let server = cli.server();
            let http_service = StreamableHttpService::new(
                move || Ok(server.clone()),
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
