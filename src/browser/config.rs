use std::path::PathBuf;

/// Desktop user agents a fresh browser context picks from
pub const USER_AGENTS: &[&str] = &[
    concat!(
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 ",
        "(KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
    ),
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    concat!(
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_3_1) AppleWebKit/605.1.15 ",
        "(KHTML, like Gecko) Version/17.3.1 Safari/605.1.15"
    ),
];

/// Options for launching a local Chrome/Chromium instance
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,

    pub window_width: u32,
    pub window_height: u32,

    /// Chrome binary to use instead of the auto-detected one
    pub chrome_path: Option<PathBuf>,

    /// Persistent profile directory
    pub user_data_dir: Option<PathBuf>,

    pub sandbox: bool,

    /// Fixed user agent; a random entry of [`USER_AGENTS`] is used when unset
    pub user_agent: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
            user_agent: None,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Options for attaching to an already running browser over its DevTools websocket
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// e.g. `ws://127.0.0.1:9222/devtools/browser/<id>`
    pub ws_url: String,

    /// Idle timeout of the DevTools connection in milliseconds
    pub timeout: u64,

    pub user_agent: Option<String>,
}

impl ConnectionOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self { ws_url: ws_url.into(), timeout: 30_000, user_agent: None }
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Where a session's browser comes from, chosen at startup by the binaries
#[derive(Debug, Clone)]
pub enum BrowserSource {
    Launch(LaunchOptions),
    Connect(ConnectionOptions),
}

impl Default for BrowserSource {
    fn default() -> Self {
        BrowserSource::Launch(LaunchOptions::default())
    }
}

impl From<LaunchOptions> for BrowserSource {
    fn from(options: LaunchOptions) -> Self {
        BrowserSource::Launch(options)
    }
}

impl From<ConnectionOptions> for BrowserSource {
    fn from(options: ConnectionOptions) -> Self {
        BrowserSource::Connect(options)
    }
}
