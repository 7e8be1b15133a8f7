//! Document source: turns a URL into a navigable document tree.
//!
//! `HttpSource` issues one blocking GET per call over a reusable
//! `reqwest::blocking::Client`. Non-success statuses and connection failures
//! are returned as transport errors and are never retried here. When
//! rendering is requested the response is passed through a `Renderer`, which
//! executes the page scripts and returns the populated DOM.
//!
//! The client keeps its connection pool between calls; a single `HttpSource`
//! is meant to be driven by one fetch loop at a time.
use log::{debug, warn};
use rates_common::RateError;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use scraper::Html;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Default page listing the live rates.
pub const TARGET_URL: &str = "https://hive.moneybees.ph/rates";
/// Default currency context passed as the `ccy` query parameter.
pub const DEFAULT_CCY: &str = "php";

/// Supplies rendered documents for a URL.
pub trait DocumentSource {
    /// Fetch `url` with `headers`, optionally running page scripts first.
    fn get(&self, url: &Url, headers: &HeaderMap, render: bool) -> Result<Html, RateError>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn get(&self, url: &Url, headers: &HeaderMap, render: bool) -> Result<Html, RateError> {
        (**self).get(url, headers, render)
    }
}

/// Executes in-page scripts and returns the resulting markup.
///
/// `HttpSource` always downloads the page first, so the status check and the
/// caller headers apply to that request. A renderer that loads `url` again on
/// its own, like `ChromiumRenderer`, costs a second download per attempt and
/// only forwards what it can express to its engine.
pub trait Renderer {
    /// Render the page at `url`. `body` is the raw markup already downloaded.
    fn render(&self, url: &Url, headers: &HeaderMap, body: &str) -> Result<String, RateError>;
}

/// HTTP document source backed by a shared blocking client.
pub struct HttpSource {
    client: Client,
    renderer: Option<Box<dyn Renderer>>,
}

impl HttpSource {
    /// Build a source with its own client and a per-request `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, RateError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    /// Build a source around an existing client session.
    pub fn with_client(client: Client) -> Self {
        HttpSource {
            client,
            renderer: None,
        }
    }

    /// Use `renderer` for requests that ask for script rendering.
    pub fn with_renderer<R: Renderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }
}

impl DocumentSource for HttpSource {
    fn get(&self, url: &Url, headers: &HeaderMap, render: bool) -> Result<Html, RateError> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).headers(headers.clone()).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;

        if !render {
            return Ok(Html::parse_document(&body));
        }
        match &self.renderer {
            Some(renderer) => {
                let rendered = renderer.render(url, headers, &body)?;
                Ok(Html::parse_document(&rendered))
            }
            None => Err(RateError::Render(String::from(
                "rendering requested but no renderer is configured",
            ))),
        }
    }
}

/// Slack added to the virtual time budget before a render run is killed.
const RENDER_SLACK: Duration = Duration::from_secs(15);
/// How often a running render child is polled.
const RENDER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Renders pages with a headless Chromium `--dump-dom` run.
///
/// Chromium loads the URL itself, runs the page scripts for the virtual time
/// budget and prints the serialized DOM. Only the `User-Agent` header is
/// passed on (`--user-agent`); other caller headers such as
/// `Accept-Language` do not reach the rendered request.
///
/// A run that has not exited within the wall-clock timeout (by default the
/// virtual time budget plus 15 s) is killed and reported as a render error.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    binary: PathBuf,
    virtual_time_budget: Duration,
    timeout: Option<Duration>,
}

impl ChromiumRenderer {
    /// Renderer using the Chromium executable at `binary`.
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        ChromiumRenderer {
            binary: binary.into(),
            virtual_time_budget: Duration::from_secs(8),
            timeout: None,
        }
    }

    /// Let page scripts run for `budget` of virtual time before dumping.
    pub fn virtual_time_budget(mut self, budget: Duration) -> Self {
        self.virtual_time_budget = budget;
        self
    }

    /// Kill a render run that takes longer than `timeout` of wall-clock time.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn wall_clock_limit(&self) -> Duration {
        self.timeout.unwrap_or(self.virtual_time_budget + RENDER_SLACK)
    }

    fn args(&self, url: &Url, headers: &HeaderMap) -> Vec<String> {
        let mut args = vec![
            String::from("--headless"),
            String::from("--disable-gpu"),
            String::from("--dump-dom"),
            format!("--virtual-time-budget={}", self.virtual_time_budget.as_millis()),
        ];
        if let Some(agent) = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()) {
            args.push(format!("--user-agent={}", agent));
        }
        args.push(url.to_string());
        args
    }
}

impl Renderer for ChromiumRenderer {
    fn render(&self, url: &Url, headers: &HeaderMap, _body: &str) -> Result<String, RateError> {
        debug!("Rendering {} with {}", url, self.binary.display());
        let mut child = Command::new(&self.binary)
            .args(self.args(url, headers))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                RateError::Render(format!("failed to start {}: {}", self.binary.display(), e))
            })?;

        // Drain both pipes while polling so a large DOM cannot stall the child.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let limit = self.wall_clock_limit();
        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= limit {
                warn!("Killing {} after {:?}", self.binary.display(), limit);
                let _ = child.kill();
                let _ = child.wait();
                return Err(RateError::Render(format!(
                    "{} did not finish within {:?}",
                    self.binary.display(),
                    limit
                )));
            }
            thread::sleep(RENDER_POLL_INTERVAL);
        };

        let stdout = join_drain(stdout)?;
        let stderr = join_drain(stderr)?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(RateError::Render(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                status,
                stderr.trim()
            )));
        }

        let dom = String::from_utf8(stdout)
            .map_err(|e| RateError::Render(format!("rendered DOM is not UTF-8: {}", e)))?;
        if dom.trim().is_empty() {
            warn!("Renderer returned an empty DOM for {}", url);
            return Err(RateError::Render(String::from("renderer returned an empty DOM")));
        }
        Ok(dom)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_drain(handle: thread::JoinHandle<Vec<u8>>) -> Result<Vec<u8>, RateError> {
    handle
        .join()
        .map_err(|_| RateError::Render(String::from("renderer output reader panicked")))
}

/// Base headers for one fetch: `user_agent` plus caller `overrides`.
///
/// Overrides replace base entries of the same name, `User-Agent` included.
pub fn merge_headers(user_agent: &str, overrides: &HeaderMap) -> Result<HeaderMap, RateError> {
    let agent = HeaderValue::from_str(user_agent)
        .map_err(|e| RateError::InvalidHeader(format!("User-Agent: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, agent);
    headers.extend(overrides.clone());
    Ok(headers)
}

/// Parse a `Name: value` pair as given on the command line.
pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), RateError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| RateError::InvalidHeader(format!("expected NAME:VALUE, got {:?}", raw)))?;

    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|e| RateError::InvalidHeader(format!("{}: {}", name.trim(), e)))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|e| RateError::InvalidHeader(format!("{}: {}", name, e)))?;
    Ok((name, value))
}

/// Build the rates URL for the `ccy` currency context.
pub fn target_url(base: &str, ccy: &str) -> Result<Url, RateError> {
    Url::parse_with_params(base, &[("ccy", ccy)])
        .map_err(|e| RateError::InvalidUrl(format!("{}: {}", base, e)))
}
