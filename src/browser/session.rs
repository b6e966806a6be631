use crate::browser::config::{BrowserSource, ConnectionOptions, LaunchOptions, USER_AGENTS};
use crate::browser::driver::{BrowserDriver, CapturedResponse, ResponseFilter, ResponseHandler, SessionLauncher};
use crate::error::BrowserError;
use base64::Engine;
use headless_chrome::browser::tab::{RequestInterceptor, RequestPausedDecision};
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Network::GetResponseBodyReturnObject;
use headless_chrome::{Browser, Tab};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Poll interval while waiting for an element to become visible
const VISIBILITY_POLL: Duration = Duration::from_millis(100);

/// Lets every paused request continue untouched
struct PassThrough;

impl RequestInterceptor for PassThrough {
    fn intercept(
        &self,
        _transport: Arc<Transport>,
        _session_id: SessionId,
        _event: RequestPausedEvent,
    ) -> RequestPausedDecision {
        RequestPausedDecision::Continue(None)
    }
}

/// One isolated Chrome page driven over the DevTools protocol
pub struct BrowserSession {
    /// Keeps the browser process (or remote connection) alive for the session
    browser: Browser,

    tab: Arc<Tab>,

    /// Names of registered response handlers, deregistered on close
    handlers: Mutex<Vec<String>>,

    closed: AtomicBool,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: &LaunchOptions) -> Result<Self, BrowserError> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // The profile scroll loop can outlive the 30s default idle timeout
        launch_opts.idle_browser_timeout = Duration::from_secs(5 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = &options.chrome_path {
            launch_opts.path = Some(path.clone());
        }

        if let Some(dir) = &options.user_data_dir {
            launch_opts.user_data_dir = Some(dir.clone());
        }

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        Self::with_browser(browser, options.user_agent.as_deref())
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: &ConnectionOptions) -> Result<Self, BrowserError> {
        let browser = Browser::connect_with_timeout(options.ws_url.clone(), connection_idle_timeout(options))
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Self::with_browser(browser, options.user_agent.as_deref())
    }

    fn with_browser(browser: Browser, user_agent: Option<&str>) -> Result<Self, BrowserError> {
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;

        let user_agent = match user_agent {
            Some(agent) => agent,
            None => USER_AGENTS.choose(&mut rand::thread_rng()).copied().unwrap_or(USER_AGENTS[0]),
        };
        tab.set_user_agent(user_agent, None, None)
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to set user agent: {}", e)))?;

        Ok(Self { browser, tab, handlers: Mutex::new(Vec::new()), closed: AtomicBool::new(false) })
    }

    /// Get the page this session drives
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }
}

/// headless_chrome reports every failure as `anyhow::Error`; timeouts are only recognizable by message
fn is_timeout(err: &anyhow::Error) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("timed out") || message.contains("timeout") || message.contains("never came")
}

/// Map a headless_chrome failure to [`BrowserError::Timeout`] when a budget ran out, else through `other`
fn classify(err: anyhow::Error, other: impl FnOnce(String) -> BrowserError) -> BrowserError {
    if is_timeout(&err) { BrowserError::Timeout(err.to_string()) } else { other(err.to_string()) }
}

fn connection_idle_timeout(options: &ConnectionOptions) -> Duration {
    Duration::from_millis(options.timeout)
}

/// Poll `check` until it reports the element visible or `timeout` elapses.
///
/// A check that times out is retried; any other failure ends the wait immediately.
fn poll_visible<F>(selector: &str, timeout: Duration, mut check: F) -> Result<(), BrowserError>
where
    F: FnMut() -> anyhow::Result<bool>,
{
    let deadline = Instant::now() + timeout;

    loop {
        match check() {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) if is_timeout(&e) => log::debug!("Visibility check for '{}' timed out, retrying", selector),
            Err(e) => {
                return Err(BrowserError::EvaluationFailed(format!(
                    "Visibility check for \"{}\" failed: {}",
                    selector, e
                )));
            }
        }

        if Instant::now() >= deadline {
            return Err(BrowserError::Timeout(format!("Selector \"{}\" not visible within timeout", selector)));
        }
        std::thread::sleep(VISIBILITY_POLL);
    }
}

/// Turn a fetched body into a [`CapturedResponse`], or `None` when it cannot be read as text
fn captured_response(url: &str, status: u16, body: GetResponseBodyReturnObject) -> Option<CapturedResponse> {
    decode_body(body.body, body.base_64_encoded)
        .map(|text| CapturedResponse { url: url.to_string(), status, body: text })
}

fn visibility_script(selector: &str) -> Result<String, BrowserError> {
    let quoted = serde_json::to_string(selector).map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?;
    Ok(format!(
        r#"(function() {{
            const el = document.querySelector({});
            if (!el) return false;
            const rect = el.getBoundingClientRect();
            const style = window.getComputedStyle(el);
            return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none';
        }})()"#,
        quoted
    ))
}

/// Decode a captured body into text; CDP hands binary-ish bodies back base64 encoded
fn decode_body(body: String, base64_encoded: bool) -> Option<String> {
    if !base64_encoded {
        return Some(body);
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(body.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

impl BrowserDriver for BrowserSession {
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.tab.set_default_timeout(timeout);

        let failed =
            |message: String| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, message));

        self.tab.navigate_to(url).map_err(|e| classify(e, failed))?;
        self.tab.wait_until_navigated().map_err(|e| classify(e, failed))?;

        Ok(())
    }

    fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let script = visibility_script(selector)?;

        poll_visible(selector, timeout, || {
            let remote = self.tab.evaluate(&script, false)?;
            Ok(remote.value.and_then(|v| v.as_bool()).unwrap_or(false))
        })
    }

    fn html(&self) -> Result<String, BrowserError> {
        self.tab.get_content().map_err(|e| classify(e, BrowserError::ContentUnavailable))
    }

    fn on_response(&self, filter: ResponseFilter, handler: ResponseHandler) -> Result<(), BrowserError> {
        let mut handlers = self
            .handlers
            .lock()
            .map_err(|e| BrowserError::InterceptionFailed(format!("Handler registry poisoned: {}", e)))?;
        let name = format!("threads-capture-{}", handlers.len());

        self.tab
            .register_response_handling(
                name.clone(),
                Box::new(move |event_params, fetch_body| {
                    let response = &event_params.response;
                    let status = response.status as u16;
                    if !filter(&response.url, status) {
                        return;
                    }

                    match fetch_body() {
                        Ok(body) => match captured_response(&response.url, status, body) {
                            Some(captured) => handler(captured),
                            None => log::debug!("Skipping undecodable body from {}", response.url),
                        },
                        Err(e) => log::debug!("Failed to fetch body of {}: {}", response.url, e),
                    }
                }),
            )
            .map_err(|e| {
                classify(e, |m| BrowserError::InterceptionFailed(format!("Failed to register response handler: {}", m)))
            })?;

        handlers.push(name);
        Ok(())
    }

    fn install_passthrough_routing(&self) -> Result<(), BrowserError> {
        self.tab
            .enable_fetch(None, None)
            .map_err(|e| {
                classify(e, |m| BrowserError::InterceptionFailed(format!("Failed to enable fetch domain: {}", m)))
            })?;
        self.tab.enable_request_interception(Arc::new(PassThrough)).map_err(|e| {
            classify(e, |m| BrowserError::InterceptionFailed(format!("Failed to install request interceptor: {}", m)))
        })?;

        Ok(())
    }

    fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        let remote = self.tab.evaluate(script, false).map_err(|e| classify(e, BrowserError::EvaluationFailed))?;
        Ok(remote.value.unwrap_or(Value::Null))
    }

    fn close(&self) -> Result<(), BrowserError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Ok(handlers) = self.handlers.lock() {
            for name in handlers.iter() {
                let _ = self.tab.deregister_response_handling(name);
            }
        }

        // The browser process itself is torn down when `Browser` is dropped
        self.tab
            .close(false)
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;

        Ok(())
    }
}

impl SessionLauncher for LaunchOptions {
    type Session = BrowserSession;

    fn launch(&self) -> Result<BrowserSession, BrowserError> {
        BrowserSession::launch(self)
    }
}

impl SessionLauncher for ConnectionOptions {
    type Session = BrowserSession;

    fn launch(&self) -> Result<BrowserSession, BrowserError> {
        BrowserSession::connect(self)
    }
}

impl SessionLauncher for BrowserSource {
    type Session = BrowserSession;

    fn launch(&self) -> Result<BrowserSession, BrowserError> {
        match self {
            BrowserSource::Launch(options) => BrowserSession::launch(options),
            BrowserSource::Connect(options) => BrowserSession::connect(options),
        }
    }
}
