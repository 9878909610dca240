use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            dom::SnapshotNode,
            error::{EvalError, Result},
            evaluator::Evaluator,
            result::EvaluationResult};
use headless_chrome::{Browser, Tab};
use std::{sync::Arc, time::Duration};

/// Browser session that captures pages for evaluation
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tab used for navigation and capture
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        launch_opts.idle_browser_timeout = Duration::from_secs(options.idle_timeout_secs);
        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }
        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| EvalError::LaunchFailed(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| EvalError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::debug!("Browser launched (headless: {})", options.headless);
        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect(options.ws_url.clone())
            .map_err(|e| EvalError::ConnectionFailed(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| EvalError::ConnectionFailed(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(options.timeout));

        log::debug!("Connected to browser at {}", options.ws_url);
        Ok(Self { browser, tab })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// Get the capture tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| EvalError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| EvalError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Capture the current document as a composed-tree snapshot
    pub fn capture_document(&self) -> Result<SnapshotNode> {
        let js_code = include_str!("capture_snapshot.js");

        let result = self
            .tab
            .evaluate(js_code, false)
            .map_err(|e| EvalError::CaptureFailed(format!("Failed to execute capture script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| EvalError::CaptureFailed("No value returned from capture script".to_string()))?;

        // The script returns a JSON string
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| EvalError::CaptureFailed(format!("Failed to get JSON string: {}", e)))?;

        SnapshotNode::from_json(&json_str)
    }

    /// Navigate to `url`, capture it and evaluate it
    pub fn evaluate_url(&self, url: &str, evaluator: &Evaluator) -> Result<EvaluationResult> {
        self.navigate(url)?;
        self.wait_for_navigation()?;
        let document = self.capture_document()?;
        log::info!("Captured {} elements from {}", document.count_elements(), url);
        Ok(evaluator.evaluate(&document))
    }
}
