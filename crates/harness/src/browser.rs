//! Playwright browser automation
//!
//! Each prediction is one generated Playwright script run with node: navigate
//! to the SUT, fill the input, click analyze, poll the result element until
//! its text is non-empty and stable, then print the prediction as a JSON line
//! on stdout for the Rust side to parse. One browser process per submission
//! keeps teardown on every exit path inside the script's own `finally`.

use std::process::{Command, Stdio};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{MrError, MrResult};
use crate::runner::PredictionSource;

/// Browser engine to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser: {other}")),
        }
    }
}

/// Where and how to reach the system under test.
#[derive(Debug, Clone)]
pub struct SutConfig {
    /// Page hosting the sentiment tool
    pub url: String,

    /// Text input element
    pub input_selector: String,

    /// Analyze / submit button
    pub submit_selector: String,

    /// Element the prediction label appears in
    pub result_selector: String,

    /// Overall wait window for each element/stabilization wait
    pub wait_timeout: Duration,

    /// Two reads this far apart must agree before the text counts as stable
    pub settle_interval: Duration,

    pub headless: bool,
    pub browser: Browser,
}

impl Default for SutConfig {
    fn default() -> Self {
        Self {
            url: "https://www.clientzen.io/sentiment-analysis-tool".to_string(),
            input_selector: "#Happiness-Score-Text-3".to_string(),
            submit_selector: "#happiness-score-button".to_string(),
            result_selector: ".aspect-based-sentiment-description".to_string(),
            wait_timeout: Duration::from_secs(20),
            settle_interval: Duration::from_millis(300),
            headless: true,
            browser: Browser::default(),
        }
    }
}

/// Line the generated script prints as its last output.
#[derive(Debug, Deserialize)]
struct DriverOutput {
    success: bool,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Handle over the Playwright toolchain, configured for one SUT.
pub struct BrowserHandle {
    config: SutConfig,
}

impl BrowserHandle {
    /// Verify the toolchain is available and return a configured handle.
    pub fn new(config: SutConfig) -> MrResult<Self> {
        Self::check_playwright_installed()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SutConfig {
        &self.config
    }

    fn check_playwright_installed() -> MrResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(MrError::PlaywrightNotFound),
        }
    }

    /// Check the SUT answers HTTP at all before burning browser time on it.
    pub async fn probe_sut(&self) -> MrResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        let attempts = 3;
        let mut last_err = String::new();
        for attempt in 1..=attempts {
            match client.get(&self.config.url).send().await {
                Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                    info!("SUT reachable at {}", self.config.url);
                    return Ok(());
                }
                Ok(resp) => last_err = format!("HTTP {}", resp.status()),
                Err(e) => last_err = e.to_string(),
            }
            debug!("SUT probe attempt {}/{} failed: {}", attempt, attempts, last_err);
            if attempt < attempts {
                sleep(Duration::from_secs(1)).await;
            }
        }

        Err(MrError::Navigation {
            url: self.config.url.clone(),
            reason: format!("unreachable after {attempts} attempts: {last_err}"),
        })
    }

    /// Submit `text` to the SUT and return the displayed prediction label.
    pub async fn fetch_prediction(&self, text: &str) -> MrResult<String> {
        let script = self.build_script(text);
        let output = self.run_script(&script).await?;

        match output.prediction {
            Some(p) if !p.trim().is_empty() => Ok(p.trim().to_string()),
            _ => Err(MrError::Timeout(format!(
                "prediction element {} stayed empty",
                self.config.result_selector
            ))),
        }
    }

    /// Build the Playwright script for one submission cycle.
    fn build_script(&self, text: &str) -> String {
        let timeout_ms = self.config.wait_timeout.as_millis();
        let settle_ms = self.config.settle_interval.as_millis();

        format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext();
  const page = await context.newPage();
  try {{
    await page.goto('{url}', {{ timeout: {timeout} }});
    await page.waitForSelector('{input}', {{ state: 'visible', timeout: {timeout} }});
    await page.fill('{input}', '');
    await page.fill('{input}', '{text}');
    await page.click('{submit}', {{ timeout: {timeout} }});

    // Poll until two consecutive reads of the result agree and are non-empty.
    const deadline = Date.now() + {timeout};
    let prev = null;
    let label = null;
    while (Date.now() < deadline) {{
      const el = await page.$('{result}');
      const current = el ? (await el.innerText()).trim() : '';
      if (current.length > 0 && current === prev) {{
        label = current;
        break;
      }}
      prev = current.length > 0 ? current : null;
      await page.waitForTimeout({settle});
    }}
    if (label === null) {{
      throw new Error('result did not stabilize: {result}');
    }}
    console.log(JSON.stringify({{ success: true, prediction: label }}));
  }} catch (error) {{
    console.log(JSON.stringify({{ success: false, error: error.message }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            url = js_escape(&self.config.url),
            input = js_escape(&self.config.input_selector),
            submit = js_escape(&self.config.submit_selector),
            result = js_escape(&self.config.result_selector),
            text = js_escape(text),
            timeout = timeout_ms,
            settle = settle_ms,
        )
    }

    /// Run the script with node and parse the JSON result line.
    async fn run_script(&self, script: &str) -> MrResult<DriverOutput> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("submit.js");
        std::fs::write(&script_path, script)?;

        debug!("Running driver script: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await
            .map_err(|e| MrError::Launch(format!("failed to spawn node: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed = parse_driver_output(&stdout).ok_or_else(|| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            MrError::Script(format!(
                "no result line from driver\nstdout: {stdout}\nstderr: {stderr}"
            ))
        })?;

        if parsed.success {
            return Ok(parsed);
        }

        let message = parsed.error.unwrap_or_else(|| "unknown driver error".to_string());
        warn!("Driver script reported failure: {}", message);
        Err(self.classify_failure(&message))
    }

    /// Map a driver failure message onto the harness error taxonomy.
    fn classify_failure(&self, message: &str) -> MrError {
        let navigation = Regex::new(r"(?i)page\.goto|net::ERR|NS_ERROR|Navigation").ok();

        if navigation.is_some_and(|re| re.is_match(message)) {
            return MrError::Navigation {
                url: self.config.url.clone(),
                reason: message.to_string(),
            };
        }
        if message.contains(&self.config.input_selector)
            || message.contains(&self.config.submit_selector)
        {
            return MrError::ElementNotFound(message.to_string());
        }
        if message.contains("did not stabilize") || message.contains(&self.config.result_selector)
        {
            return MrError::Timeout(message.to_string());
        }
        MrError::Script(message.to_string())
    }
}

#[async_trait::async_trait]
impl PredictionSource for BrowserHandle {
    async fn predict(&self, text: &str) -> MrResult<String> {
        self.fetch_prediction(text).await
    }
}

/// Escape a string for single-quoted JS literals.
fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// The result line is the last stdout line that parses as a `DriverOutput`.
fn parse_driver_output(stdout: &str) -> Option<DriverOutput> {
    stdout
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<DriverOutput>(line.trim()).ok())
}
